//! End-to-end tests across the flowplan crates.
//!
//! Tests exercise the full path a stored flowchart takes: JSON caches ->
//! migration of an old record -> a client batch of update chunks decoded from
//! JSON -> MutationEngine -> derived-field refresh -> change detection.

use serde_json::json;

use flowplan_core::{CourseCache, PositionedFlowchart, ProgramCache, Term};
use flowplan_engine::{
    generate_flowchart, refresh_derived, GenerateRequest, IncomingChunk, MutationEngine,
    MutationOutcome, MutationResponse,
};
use flowplan_storage::{compare_flow_hashes, is_valid_flow_hash, upgrade, HashChange};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn caches() -> (CourseCache, ProgramCache) {
    let courses: CourseCache = serde_json::from_value(json!([
        {
            "catalog": "2019-2020",
            "courses": [
                { "id": "CSC101", "catalog": "2019-2020", "displayName": "CSC 101", "units": "4" },
                { "id": "CSC202", "catalog": "2019-2020", "displayName": "CSC 202", "units": "4" },
                { "id": "BIO161", "catalog": "2019-2020", "displayName": "BIO 161", "units": "4-6" }
            ]
        },
        {
            "catalog": "2020-2021",
            "courses": [
                { "id": "MATH141", "catalog": "2020-2021", "displayName": "MATH 141", "units": "4" }
            ]
        }
    ]))
    .unwrap();
    let programs: ProgramCache = serde_json::from_value(json!([
        { "id": "prog-cs", "catalog": "2019-2020", "majorName": "Computer Science", "concName": "General" },
        { "id": "prog-math", "catalog": "2020-2021", "majorName": "Mathematics", "concName": "Pure" }
    ]))
    .unwrap();
    (courses, programs)
}

fn legacy_record() -> serde_json::Value {
    json!({
        "dataModelVersion": 4,
        "id": "legacy-1",
        "name": "Freshman Plan",
        "startYear": "2019",
        "flowCode": "2019-2020|Computer Science|General",
        "lastUpdatedUTC": "2019-09-01T00:00:00Z",
        "quarters": [
            { "qIndex": 1, "qUnits": "8", "classes": [
                { "cID": "CSC101", "color": "rgb(16, 32, 48)" },
                { "cID": "BIO161", "color": "#abcdef" }
            ] },
            { "qIndex": 2, "qUnits": "4", "classes": [
                { "cID": "CSC202", "color": "#abcdef" }
            ] }
        ]
    })
}

fn chunks(value: serde_json::Value) -> Vec<IncomingChunk> {
    serde_json::from_value(value).unwrap()
}

// ---------------------------------------------------------------------------
// Migration then mutation
// ---------------------------------------------------------------------------

#[test]
fn migrated_flowchart_accepts_client_edits() {
    let (courses, programs) = caches();
    let flowchart = upgrade("owner-1", legacy_record(), &courses, &programs).unwrap();
    assert_eq!(flowchart.term(1).unwrap().t_units, "8-10");
    assert_eq!(flowchart.unit_total, "12-14");
    assert_eq!(flowchart.term(1).unwrap().courses[0].color, "#102030");
    let original_hash = flowchart.hash.clone();

    let collection = vec![PositionedFlowchart { flowchart, pos: 0 }];
    let batch = chunks(json!([
        {
            "type": "FLOW_TERM_MOD",
            "data": {
                "id": "legacy-1",
                "tIndex": 2,
                "termData": [
                    { "type": "EXISTING", "data": { "tIndex": 2, "cIndex": 0 } },
                    { "type": "EXISTING", "data": { "tIndex": 1, "cIndex": 1 } }
                ]
            }
        },
        {
            "type": "FLOW_TERM_MOD",
            "data": {
                "id": "legacy-1",
                "tIndex": 1,
                "termData": [
                    { "type": "EXISTING", "data": { "tIndex": 1, "cIndex": 0 } },
                    { "type": "NEW", "data": { "id": null, "color": "#fff", "customId": "Seminar", "customUnits": "1" } }
                ]
            }
        },
        { "type": "FLOW_TERMS_ADD", "data": { "id": "legacy-1", "tIndexes": [3] } }
    ]));

    let outcome = MutationEngine::new(&courses, &programs)
        .apply(&collection, &batch)
        .unwrap();
    let MutationOutcome::Applied(mut result) = outcome else {
        panic!("batch rejected");
    };

    let flowchart = &mut result[0].flowchart;
    assert_eq!(flowchart.term(1).unwrap().t_units, "5");
    assert_eq!(flowchart.term(2).unwrap().t_units, "8-10");
    assert!(flowchart.term(3).unwrap().courses.is_empty());

    refresh_derived(flowchart, &courses, &programs).unwrap();
    assert_eq!(flowchart.unit_total, "13-15");
    assert!(is_valid_flow_hash(&flowchart.hash));
    assert_eq!(
        compare_flow_hashes(&original_hash, &flowchart.hash),
        HashChange::ContentOnly
    );
}

#[test]
fn rejected_batch_reports_every_failure() {
    let (courses, programs) = caches();
    let flowchart = upgrade("owner-1", legacy_record(), &courses, &programs).unwrap();
    let collection = vec![PositionedFlowchart { flowchart, pos: 0 }];

    let batch = chunks(json!([
        { "type": "FLOW_DELETE", "data": { "id": "nope" } },
        { "type": "FLOW_ARCHIVE", "data": { "id": "legacy-1" } },
        { "type": "FLOW_TERMS_DELETE", "data": { "id": "legacy-1", "tIndexes": [-1] } },
        { "type": "FLOW_TERMS_ADD", "data": { "id": "legacy-1" } }
    ]));

    let outcome = MutationEngine::new(&courses, &programs)
        .apply(&collection, &batch)
        .unwrap();
    let response = serde_json::to_value(MutationResponse::from(outcome)).unwrap();
    assert_eq!(response["success"], false);
    assert!(response.get("flowchartsData").is_none());
    assert_eq!(response["errors"].as_array().unwrap().len(), 4);
}

// ---------------------------------------------------------------------------
// Generation then mutation
// ---------------------------------------------------------------------------

#[test]
fn generated_double_major_flowchart_can_be_reordered() {
    let (courses, programs) = caches();
    let request: GenerateRequest = serde_json::from_value(json!({
        "ownerId": "owner-1",
        "name": "Double",
        "programIds": ["prog-cs", "prog-math"],
        "startYear": "2020"
    }))
    .unwrap();
    assert!(request.course_merge);

    let templates: Vec<Vec<Term>> = vec![
        serde_json::from_value(json!([
            { "tIndex": -1, "tUnits": "0", "courses": [] },
            { "tIndex": 1, "tUnits": "4", "courses": [{ "id": "CSC101", "color": "#fff" }] }
        ]))
        .unwrap(),
        serde_json::from_value(json!([
            { "tIndex": 1, "tUnits": "4", "courses": [{ "id": "MATH141", "color": "#000" }] }
        ]))
        .unwrap(),
    ];

    let flowchart = generate_flowchart(&request, &templates, &courses, &programs).unwrap();
    assert_eq!(flowchart.term(1).unwrap().t_units, "8");
    assert_eq!(flowchart.unit_total, "8");

    let id = flowchart.id.clone();
    let collection = vec![PositionedFlowchart { flowchart, pos: 0 }];
    // Swap the two courses; MATH141 keeps its second-program tag and thus
    // its 2020-2021 catalog.
    let batch = chunks(json!([{
        "type": "FLOW_TERM_MOD",
        "data": {
            "id": id,
            "tIndex": 1,
            "termData": [
                { "type": "EXISTING", "data": { "tIndex": 1, "cIndex": 1 } },
                { "type": "EXISTING", "data": { "tIndex": 1, "cIndex": 0 } }
            ]
        }
    }]));

    let outcome = MutationEngine::new(&courses, &programs)
        .apply(&collection, &batch)
        .unwrap();
    let MutationOutcome::Applied(result) = outcome else {
        panic!("batch rejected");
    };
    let term = result[0].flowchart.term(1).unwrap();
    assert_eq!(term.courses[0].id.as_deref(), Some("MATH141"));
    assert_eq!(term.courses[0].program_id_index, Some(1));
    assert_eq!(term.t_units, "8");
}
