use planmatrix_engine::pain::{self, PainCategory};
use planmatrix_engine::value::{self, ValueKind};
use planmatrix_engine::{
    CellDisplay, CharacteristicRecord, ComparisonSession, FilterState, MatrixConfig, MatrixView,
    MemoryPreferences, MemoryStore, Plan, PlanSnapshot, PlanStore, ProgressDirection, StickyNames,
    aggregate, build_view, extract_sticky, resolve_section_order,
};

fn sample_plans() -> Vec<Plan> {
    PlanSnapshot::from_json(include_str!("../../data/sample_plans.json"))
        .unwrap()
        .plans
}

fn row_keys(view: &MatrixView) -> Vec<String> {
    view.rows
        .iter()
        .map(|r| format!("{}/{}", r.row.section, r.row.characteristic))
        .collect()
}

fn approx(value: Option<f64>, expected: f64) -> bool {
    value.is_some_and(|v| (v - expected).abs() < 1e-6)
}

#[test]
fn sample_matrix_renders_in_resolved_order() {
    let view = build_view(
        &sample_plans(),
        &FilterState::default(),
        None,
        &MatrixConfig::default(),
    );

    assert_eq!(view.plans, vec!["Standard", "Expert", "Ultra"]);
    let sticky: Vec<&str> = view
        .sticky
        .iter()
        .map(|r| r.row.characteristic.as_str())
        .collect();
    assert_eq!(sticky, vec!["Cost", "Timeline"]);
    assert_eq!(
        view.sections,
        vec!["Documents", "Pricing", "Support", "Terms", "Urgency"]
    );
    assert_eq!(
        row_keys(&view),
        vec![
            "Support/Support",
            "Documents/Audit report",
            "Support/Hotline",
            "Support/Dedicated manager",
            "Urgency/Preparation days",
        ]
    );
}

#[test]
fn sticky_cells_strip_encoding_and_carry_progress() {
    let view = build_view(
        &sample_plans(),
        &FilterState::default(),
        None,
        &MatrixConfig::default(),
    );
    let cost = &view.sticky[0].cells;
    assert_eq!(cost[0].display, CellDisplay::Text("From 220k".to_string()));
    assert!(approx(cost[0].progress, 30.0));
    assert!(approx(cost[1].progress, 70.0));
    assert_eq!(cost[2].display, CellDisplay::Text("On request".to_string()));
    assert_eq!(cost[2].progress, None);
}

#[test]
fn progress_uses_raw_values_and_missing_plans_stay_empty() {
    let view = build_view(
        &sample_plans(),
        &FilterState::default(),
        None,
        &MatrixConfig::default(),
    );
    let days = view
        .rows
        .iter()
        .find(|r| r.row.characteristic == "Preparation days")
        .unwrap();
    assert_eq!(days.cells[0].display, CellDisplay::Text("14 days".to_string()));
    assert!(approx(days.cells[0].progress, 100.0));
    assert!(approx(days.cells[1].progress, 400.0 / 11.0));
    assert!(approx(days.cells[2].progress, 0.0));

    let audit = view
        .rows
        .iter()
        .find(|r| r.row.characteristic == "Audit report")
        .unwrap();
    assert_eq!(audit.cells[0].display, CellDisplay::Text("Basic".to_string()));
    assert!(approx(audit.cells[0].progress, 0.0));
    assert!(approx(audit.cells[1].progress, 100.0));
    assert_eq!(audit.cells[2].display, CellDisplay::Empty);
    assert_eq!(audit.cells[2].progress, None);
}

#[test]
fn inverted_direction_applies_per_characteristic() {
    let mut config = MatrixConfig::default();
    config
        .progress_direction
        .insert("Preparation days".to_string(), ProgressDirection::LowerIsFuller);
    let view = build_view(&sample_plans(), &FilterState::default(), None, &config);
    let days = view
        .rows
        .iter()
        .find(|r| r.row.characteristic == "Preparation days")
        .unwrap();
    assert!(approx(days.cells[0].progress, 0.0));
    assert!(approx(days.cells[2].progress, 100.0));
}

#[test]
fn filter_dimensions_combine_over_sample() {
    let plans = sample_plans();
    let config = MatrixConfig::default();

    let personal = FilterState::new().with_personal([PainCategory::Security]);
    assert_eq!(
        row_keys(&build_view(&plans, &personal, None, &config)),
        vec!["Documents/Audit report"]
    );

    let corporate = FilterState::new().with_corporate([PainCategory::Speed]);
    assert_eq!(
        row_keys(&build_view(&plans, &corporate, None, &config)),
        vec!["Urgency/Preparation days"]
    );

    let both = personal.clone().with_corporate([PainCategory::Speed]);
    assert_eq!(
        row_keys(&build_view(&plans, &both, None, &config)),
        vec!["Documents/Audit report", "Urgency/Preparation days"]
    );

    let section = FilterState::new().with_section("Support");
    let view = build_view(&plans, &section, None, &config);
    assert_eq!(view.sticky.len(), 2);
    assert_eq!(
        row_keys(&view),
        vec![
            "Support/Support",
            "Support/Hotline",
            "Support/Dedicated manager"
        ]
    );
}

#[test]
fn combined_filter_scenario() {
    let plans = vec![Plan::new(
        "Basic",
        vec![CharacteristicRecord::new("S", "R").with_pains("Ease", "Speed")],
    )];
    let config = MatrixConfig::default();
    let kept = FilterState::new()
        .with_personal([PainCategory::Security])
        .with_corporate([PainCategory::Speed]);
    assert_eq!(build_view(&plans, &kept, None, &config).rows.len(), 1);

    let dropped = FilterState::new().with_personal([PainCategory::Security]);
    assert!(build_view(&plans, &dropped, None, &config).rows.is_empty());
}

#[test]
fn first_plan_wins_row_metadata() {
    let rows = aggregate(&sample_plans());
    let hotline = rows
        .iter()
        .find(|r| r.characteristic == "Hotline")
        .unwrap();
    assert_eq!(hotline.description, "Phone line for urgent issues");
    assert_eq!(
        hotline.personal_set().iter().collect::<Vec<_>>(),
        vec![PainCategory::Ease, PainCategory::Speed]
    );
    assert_eq!(hotline.value_for("Ultra"), "24/7");
}

#[test]
fn timeline_before_cost_still_extracts_cost_first() {
    let plans = vec![Plan::new(
        "Basic",
        vec![
            CharacteristicRecord::new("Terms", "Timeline").as_header(),
            CharacteristicRecord::new("Pricing", "Cost").as_header(),
        ],
    )];
    let split = extract_sticky(aggregate(&plans), &StickyNames::default());
    let names: Vec<&str> = split
        .sticky
        .iter()
        .map(|r| r.characteristic.as_str())
        .collect();
    assert_eq!(names, vec!["Cost", "Timeline"]);
    assert!(split.rest.is_empty());
}

#[test]
fn section_order_fallback_scenario() {
    let known = vec!["B".to_string(), "A".to_string(), "C".to_string()];
    let preference = vec!["A".to_string(), "Z".to_string()];
    assert_eq!(
        resolve_section_order(&known, Some(preference.as_slice())),
        vec!["A", "B", "C"]
    );
}

#[test]
fn decode_scenarios() {
    let parenthetical = value::decode("Delivered in 2 days (75%)");
    assert_eq!(parenthetical.display_text, "Delivered in 2 days");
    assert_eq!(parenthetical.magnitude, Some(75));

    let bare = value::decode("120");
    assert_eq!(bare.display_text, "120");
    assert_eq!(bare.magnitude, Some(120));

    let empty = value::decode("-");
    assert_eq!(empty.kind, ValueKind::Empty);
    assert_eq!(empty.magnitude, None);
}

#[test]
fn unknown_pain_tokens_are_reported_not_kept() {
    let parse = pain::normalize_with_report("Security, unknown-tag");
    assert_eq!(parse.set.iter().collect::<Vec<_>>(), vec![PainCategory::Security]);
    assert_eq!(parse.dropped, vec!["unknown-tag".to_string()]);
}

#[test]
fn session_edit_flow_over_sample() {
    let store = MemoryStore::new(sample_plans());
    let mut session =
        ComparisonSession::open(store.clone(), MemoryPreferences::new(), MatrixConfig::default())
            .unwrap();

    let row = session.row("Support", "Hotline").unwrap();
    let mut draft = session.draft_for(&row);
    draft.personal_pain.toggle(PainCategory::Savings);
    let outcome = session.save_edit(&row, &draft);
    assert!(outcome.is_complete());
    assert_eq!(outcome.results.len(), 1);

    let saved = store.list_plans().unwrap();
    let record = saved[0].find("Support", "Hotline").unwrap();
    assert_eq!(record.personal_pain, "Ease, Savings, Speed");
    let reloaded = session.row("Support", "Hotline").unwrap();
    assert_eq!(pain::canonicalize(&reloaded.personal_pain), "Ease, Savings, Speed");
}

#[test]
fn reorder_failure_is_observable_until_refresh() {
    let store = MemoryStore::new(sample_plans());
    let mut session =
        ComparisonSession::open(store.clone(), MemoryPreferences::new(), MatrixConfig::default())
            .unwrap();
    store.fail_next(1);
    let outcome = session.reorder_characteristics(
        "Support",
        &["Dedicated manager".to_string(), "Hotline".to_string()],
    );
    assert!(outcome.is_diverged());
    let local = row_keys(&session.view());
    assert_eq!(local[2], "Support/Dedicated manager");

    let remote = store.list_plans().unwrap();
    assert_eq!(remote[0].characteristics[3].characteristic, "Hotline");

    session.refresh().unwrap();
    assert_eq!(row_keys(&session.view())[2], "Support/Hotline");
}
