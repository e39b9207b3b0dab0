//! Normalization Integration Tests
//!
//! Realistic agent responses run through the public normalization API:
//! - fence unwrapping and lenient decoding
//! - item extraction across every response shape
//! - name projection, polymorphic fields and evaluation content

use serde_json::{json, Value};

use avagama_normalize::{
    decode_lenient, extract_content, extract_items, normalize_use_case_names, project_names,
    resolve_polymorphic, summarize, unwrap_fenced, ContentResult, Decoded,
};

// ============================================================================
// Helpers
// ============================================================================

fn completion(content: &str) -> Value {
    json!({
        "id": "cmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

fn names(response: &Value) -> Vec<String> {
    normalize_use_case_names(response).into_vec()
}

// ============================================================================
// Text unwrapping and decoding
// ============================================================================

#[test]
fn test_unwrap_with_and_without_language_tag() {
    assert_eq!(unwrap_fenced("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    assert_eq!(unwrap_fenced("```\n  [1, 2]  \n```"), "[1, 2]");
    assert_eq!(
        unwrap_fenced("Here is the result:\n```json\n{\"a\": 1}\n```\nThanks!"),
        "{\"a\": 1}"
    );
    assert_eq!(unwrap_fenced("  plain text \n"), "plain text");
}

#[test]
fn test_lenient_decode_never_fails() {
    assert_eq!(
        decode_lenient("{\"score\": 65}"),
        Decoded::Json(json!({"score": 65}))
    );
    assert_eq!(
        decode_lenient("{\"score\": 65"),
        Decoded::Raw("{\"score\": 65".to_string())
    );
    assert!(decode_lenient("").is_raw());
}

#[test]
fn test_dimensions_alias_is_idempotent() {
    let first = decode_lenient("{\"dimensions\": {\"volume\": {\"score\": 70}}}")
        .into_json()
        .unwrap();
    assert_eq!(first["process_characteristics"], first["dimensions"]);

    let again = decode_lenient(&first.to_string()).into_json().unwrap();
    assert_eq!(again, first);
}

// ============================================================================
// Item extraction
// ============================================================================

#[test]
fn test_canonical_list_keeps_order() {
    let response = json!({"use_cases": [{"title": "A"}, {"title": "B"}]});
    assert_eq!(names(&response), ["A", "B"]);
}

#[test]
fn test_double_wrapped_history_record() {
    let response = json!({"agent_response": {"use_cases": [{"name": "X"}]}});
    assert_eq!(extract_items(&response), vec![json!({"name": "X"})]);
}

#[test]
fn test_completion_with_fenced_array() {
    let response = completion("```json\n[{\"title\": \"Y\"}]\n```");
    assert_eq!(names(&response), ["Y"]);
}

#[test]
fn test_completion_with_nested_company_payload() {
    let response = completion(
        "```json\n{\"company\": {\"company_name\": \"Acme\", \"industry\": \"Retail\", \
         \"analysis\": {\"opportunities\": [{\"use_case\": \"Demand forecasting\"}, {\"use_case\": \"Shelf audits\"}]}}}\n```",
    );
    assert_eq!(names(&response), ["Demand forecasting", "Shelf audits"]);
}

#[test]
fn test_alternate_list_keys() {
    assert_eq!(names(&json!({"items": [{"title": "I"}]})), ["I"]);
    assert_eq!(names(&json!({"results": [{"name": "R"}]})), ["R"]);
    assert_eq!(names(&json!({"data": [{"use_case": "D"}]})), ["D"]);
}

#[test]
fn test_unusable_shapes_yield_nothing() {
    for response in [
        json!({}),
        Value::Null,
        json!("just text"),
        json!(42),
        json!({"choices": []}),
        json!({"choices": [{"message": {"content": "I could not find any use cases."}}]}),
        json!({"choices": [{"message": {"content": "```json\n{\"note\": \"none\"}\n```"}}]}),
        json!({"agent_response": {}}),
    ] {
        assert!(extract_items(&response).is_empty(), "{}", response);
        assert!(names(&response).is_empty());
    }
}

// ============================================================================
// Names, fields and content
// ============================================================================

#[test]
fn test_name_priority_and_dedup() {
    let items = vec![
        json!({"title": "Dup"}),
        json!({"use_case": "Dup"}),
        json!({"name": "New"}),
        json!({"title": "  New  ", "name": "Ignored"}),
        json!("not a mapping"),
        json!({"title": ""}),
        json!({"description": "no name"}),
    ];
    assert_eq!(project_names(&items).into_vec(), ["Dup", "New"]);
}

#[test]
fn test_polymorphic_score() {
    let probes = ["score", "value"];
    assert_eq!(
        resolve_polymorphic(Some(&json!({"score": 65})), &probes, json!(0)),
        json!(65)
    );
    assert_eq!(resolve_polymorphic(Some(&json!(65)), &probes, json!(0)), json!(65));
    assert_eq!(resolve_polymorphic(Some(&json!({})), &probes, json!(0)), json!(0));
    assert_eq!(resolve_polymorphic(None, &probes, json!(0)), json!(0));
}

#[test]
fn test_evaluation_content_shapes() {
    let parsed = extract_content(&completion(
        "```json\n{\"fitment\": \"RPA\", \"dimensions\": {\"volume\": {\"score\": 3}}}\n```",
    ))
    .unwrap();
    assert_eq!(parsed.get("fitment"), Some(&json!("RPA")));
    assert!(parsed.get("process_characteristics").is_some());

    let raw = extract_content(&completion("The process is a good fit for RPA.")).unwrap();
    assert_eq!(
        raw,
        ContentResult::RawText("The process is a good fit for RPA.".to_string())
    );
    assert_eq!(raw.to_value(), json!({"raw_text": "The process is a good fit for RPA."}));

    assert_eq!(extract_content(&json!({"error": "quota"})), None);
}

#[test]
fn test_summaries_sorted_by_rating() {
    let response = json!({
        "industry": "Banking",
        "use_cases": [
            {"title": "Low", "rating": 4},
            {"title": "High", "business_benefit_score": {"score": 90}, "domain": "Risk"},
            {"title": "Mid", "rating": 7, "description": "Middle"}
        ]
    });
    let summaries = summarize(&response);
    let titles: Vec<_> = summaries.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["High", "Mid", "Low"]);
    assert_eq!(summaries[0].rating, 9.0);
    assert_eq!(summaries[0].domain, "Risk");
    assert_eq!(summaries[1].description, "Middle");
}
