use topicmesh_core::reconcile::{CompanyMentionRecord, TopicMentionRecord};
use topicmesh_core::{
    manual_topic, reconcile, EditorState, EntityKind, EntityRef, LegacyMentions, MentionEvent,
    MentionSet, TopicSuggestion,
};

fn legacy_post() -> LegacyMentions {
    LegacyMentions {
        companies: vec![
            CompanyMentionRecord {
                company_id: "c1".to_string(),
                name: "Acme".to_string(),
                company_type: Some("ADVERTISER".to_string()),
            },
            CompanyMentionRecord {
                company_id: "c2".to_string(),
                name: "Horizon Media".to_string(),
                company_type: Some("AGENCY".to_string()),
            },
        ],
        contacts: Vec::new(),
        topics: vec![TopicMentionRecord {
            topic_id: None,
            name: "ad-fraud".to_string(),
            description: None,
            context: None,
        }],
    }
}

#[test]
fn editing_legacy_post_starts_with_three_and_removal_leaves_two() {
    let prior = legacy_post().into_mention_set();
    assert_eq!(prior.len(), 3);

    let state = EditorState::with_prior(prior, None);
    assert_eq!(state.mentions().len(), 3);

    let state = state.reduce(MentionEvent::ManualRemoved {
        id: "manual-ad-fraud".to_string(),
    });
    assert_eq!(
        state.mentions().topic_ids(),
        vec!["company:c1", "company:c2"]
    );
}

#[test]
fn manual_topic_and_accepted_suggestion_for_same_company_collapse() {
    let prior = MentionSet::new();
    let accepted = vec![EntityRef::existing(EntityKind::Advertiser, "c1", "Acme").with_confidence(0.9)];
    let manual = vec![
        EntityRef::existing(EntityKind::Company, "c1", "Acme Inc"),
        manual_topic("Programmatic  Advertising!").unwrap(),
        manual_topic("programmatic-advertising").unwrap(),
    ];

    let merged = reconcile(&prior, &accepted, &manual, &[]);
    assert_eq!(
        merged.topic_ids(),
        vec!["company:c1", "manual-programmatic-advertising"]
    );
    let acme = merged.get("company:c1").unwrap();
    assert_eq!(acme.display_name, "Acme");
    assert_eq!(acme.confidence, 1.0);
}

#[test]
fn reconcile_is_idempotent() {
    let prior = legacy_post().into_mention_set();
    let accepted = vec![EntityRef::existing(EntityKind::Contact, "p1", "Jane Doe")];
    let manual = vec![manual_topic("Retail Media").unwrap()];
    let removals = vec!["c2".to_string()];

    let once = reconcile(&prior, &accepted, &manual, &removals);
    let twice = reconcile(&once, &accepted, &manual, &removals);
    assert_eq!(once, twice);
    assert_eq!(
        once.topic_ids(),
        vec!["company:c1", "manual-ad-fraud", "contact:p1", "manual-retail-media"]
    );
}

#[test]
fn editor_session_tracks_reconcile_of_its_inputs() {
    let mut state = EditorState::with_prior(legacy_post().into_mention_set(), None);
    let ticket = state.begin_suggestions("Acme and Jane Doe discuss CTV");
    let state = state
        .reduce(MentionEvent::SuggestionsLoaded {
            ticket,
            suggestions: vec![
                TopicSuggestion::new(
                    EntityRef::existing(EntityKind::Contact, "p1", "Jane Doe").with_confidence(0.9),
                ),
                TopicSuggestion::new(EntityRef::free_text("CTV").unwrap().with_confidence(0.5)),
            ],
        })
        .reduce(MentionEvent::SuggestionToggled {
            key: "contact:p1".to_string(),
        })
        .reduce(MentionEvent::ManualAdded {
            raw: "Retail Media".to_string(),
        })
        .reduce(MentionEvent::ManualRemoved {
            id: "company:c2".to_string(),
        });

    let expected = reconcile(
        state.prior(),
        state.accepted(),
        state.manual(),
        state.removals(),
    );
    assert_eq!(state.mentions(), expected);
    assert_eq!(
        state.mentions().topic_ids(),
        vec![
            "company:c1",
            "manual-ad-fraud",
            "contact:p1",
            "manual-retail-media"
        ]
    );
    assert!(!state.is_accepted("manual-ctv"));
}

#[test]
fn payload_lists_reconciled_keys_and_omits_untouched_primary() {
    let state = EditorState::with_prior(legacy_post().into_mention_set(), None);
    let json = state.payload().to_json().unwrap();
    assert_eq!(
        json,
        r#"{"topicIds":["company:c1","company:c2","manual-ad-fraud"]}"#
    );
}
