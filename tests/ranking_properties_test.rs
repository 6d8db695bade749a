use gcsl_leaderboard::domain::dates::parse_completion_date;
use gcsl_leaderboard::{rank, FixedRankings, Participant};
use std::collections::HashMap;

fn person(name: &str, email: &str, skill: u32, arcade: u32, date: Option<&str>) -> Participant {
    Participant {
        name: name.to_string(),
        email: email.to_string(),
        skill_badges: skill,
        arcade_games: arcade,
        profile_url: String::new(),
        completion_date: date.and_then(parse_completion_date),
    }
}

fn roster() -> Vec<Participant> {
    vec![
        person("Amy", "amy@x.com", 15, 2, None),
        person("Bob", "bob@x.com", 15, 2, None),
        person("Cid", "cid@x.com", 19, 1, Some("2024-01-09")),
        person("Dee", "dee@x.com", 20, 3, None),
        person("Eve", "eve@x.com", 19, 1, Some("03/01/2024")),
        person("Fay", "", 0, 0, None),
        person("Amy", "amy@x.com", 15, 2, None),
        person("Gus", "gus@x.com", 19, 1, None),
        person("Hal", "hal@x.com", 2, 7, None),
    ]
}

#[test]
fn test_rank_is_a_permutation_of_the_input() {
    let input = roster();
    let mut overrides = FixedRankings::new();
    overrides.insert("hal@x.com".to_string(), 2);
    overrides.insert("nobody@x.com".to_string(), 1);

    let ranked = rank(&input, &overrides);
    assert_eq!(ranked.len(), input.len());

    let count = |items: Vec<&Participant>| {
        items.into_iter().fold(HashMap::new(), |mut acc, p| {
            *acc.entry((p.name.clone(), p.email.clone())).or_insert(0usize) += 1;
            acc
        })
    };
    let before = count(input.iter().collect());
    let after = count(ranked.iter().map(|e| &e.participant).collect());
    assert_eq!(before, after);

    let ranks: Vec<usize> = ranked.iter().map(|e| e.rank).collect();
    assert_eq!(ranks, (1..=input.len()).collect::<Vec<_>>());
}

#[test]
fn test_rank_does_not_mutate_inputs() {
    let input = roster();
    let snapshot = input.clone();
    let overrides = FixedRankings::from([("bob@x.com".to_string(), 1)]);
    let _ = rank(&input, &overrides);
    assert_eq!(input, snapshot);
}

#[test]
fn test_full_ordering() {
    let overrides = FixedRankings::from([("hal@x.com".to_string(), 1)]);
    let ranked = rank(&roster(), &overrides);
    let names: Vec<&str> = ranked.iter().map(|e| e.participant.name.as_str()).collect();

    // fixed, dated qualifiers by date, then score order (Gus has no date)
    assert_eq!(
        names,
        vec!["Hal", "Eve", "Cid", "Dee", "Gus", "Amy", "Amy", "Bob", "Fay"]
    );
}

#[test]
fn test_fully_tied_rows_keep_input_order() {
    let mut first = person("Twin", "twin@x.com", 5, 5, None);
    let mut second = first.clone();
    first.profile_url = "https://first".to_string();
    second.profile_url = "https://second".to_string();

    let ranked = rank(&[first.clone(), second.clone()], &FixedRankings::new());
    assert_eq!(ranked[0].participant, first);
    assert_eq!(ranked[1].participant, second);

    let ranked = rank(&[second.clone(), first.clone()], &FixedRankings::new());
    assert_eq!(ranked[0].participant, second);
}

#[test]
fn test_override_precedence_ignores_scores_and_dates() {
    let roster = vec![
        person("Dated", "dated@x.com", 19, 1, Some("2020-01-01")),
        person("Champion", "champ@x.com", 99, 99, None),
        person("Low", "low@x.com", 0, 0, None),
        person("Lower", "lower@x.com", 0, 0, None),
    ];
    let overrides = FixedRankings::from([
        ("lower@x.com".to_string(), 1),
        ("low@x.com".to_string(), 5),
    ]);

    let ranked = rank(&roster, &overrides);
    assert_eq!(ranked[0].participant.name, "Lower");
    assert_eq!(ranked[1].participant.name, "Low");
    assert_eq!(ranked[2].participant.name, "Dated");
    assert_eq!(ranked[3].participant.name, "Champion");
}

#[test]
fn test_qualifying_date_precedes_higher_score() {
    let roster = vec![
        person("NoDate", "a@x.com", 20, 3, None),
        person("Qualified", "b@x.com", 19, 1, Some("2024-01-05")),
    ];
    let ranked = rank(&roster, &FixedRankings::new());
    assert_eq!(ranked[0].participant.name, "Qualified");
    assert!(ranked[0].qualified);
    assert!(!ranked[1].qualified);
}

#[test]
fn test_score_tie_falls_back_to_name() {
    let roster = vec![
        person("Bob", "bob@x.com", 15, 2, None),
        person("Amy", "amy@x.com", 15, 2, None),
    ];
    let ranked = rank(&roster, &FixedRankings::new());
    assert_eq!(ranked[0].participant.name, "Amy");
    assert_eq!(ranked[1].participant.name, "Bob");
}

#[test]
fn test_lower_case_name_is_not_pushed_behind_capitals() {
    let roster = vec![
        person("Bob", "bob@x.com", 15, 2, None),
        person("amy", "amy@x.com", 15, 2, None),
    ];
    let ranked = rank(&roster, &FixedRankings::new());
    assert_eq!(ranked[0].participant.name, "amy");
    assert_eq!(ranked[1].participant.name, "Bob");
}

#[test]
fn test_date_formats_rank_identically() {
    let other = person("Other", "o@x.com", 19, 1, Some("2024-01-06"));

    let iso = vec![
        other.clone(),
        person("Target", "t@x.com", 19, 1, Some("2024-01-05")),
    ];
    let day_first = vec![
        other,
        person("Target", "t@x.com", 19, 1, Some("05/01/2024")),
    ];

    let a = rank(&iso, &FixedRankings::new());
    let b = rank(&day_first, &FixedRankings::new());
    assert_eq!(a, b);
    assert_eq!(a[0].participant.name, "Target");
}

#[test]
fn test_empty_roster() {
    assert!(rank(&[], &FixedRankings::from([("a@x.com".to_string(), 1)])).is_empty());
}
