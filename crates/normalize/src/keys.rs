//! Well-known keys of agent payloads.

/// Canonical list field holding use-case records.
pub const USE_CASES_KEY: &str = "use_cases";

/// Field under which persisted records wrap the original agent response.
pub const AGENT_RESPONSE_KEY: &str = "agent_response";

/// Alternate top-level list fields, probed in order.
pub const ALTERNATE_LIST_KEYS: [&str; 3] = ["items", "results", "data"];

/// Name-bearing fields of an item record, highest priority first.
pub const NAME_KEYS: [&str; 3] = ["title", "use_case", "name"];

/// Description-bearing fields of an item record.
pub const DESCRIPTION_KEYS: [&str; 3] = ["description", "benefits", "details"];

/// Domain-bearing fields of an item record or a company payload.
pub const DOMAIN_KEYS: [&str; 3] = ["domain", "category", "industry"];

/// Root-level domain fields of a company payload, highest priority first.
pub const ROOT_DOMAIN_KEYS: [&str; 3] = ["industry", "category", "domain"];

/// Canonical field for evaluation characteristics.
pub const CHARACTERISTICS_KEY: &str = "process_characteristics";

/// Synonym some agent versions use for `process_characteristics`.
pub const DIMENSIONS_KEY: &str = "dimensions";

/// Sub-keys probed on a polymorphic score field.
pub const SCORE_PROBES: [&str; 2] = ["score", "value"];

/// Legacy names of the LLM recommendation field, newest first.
pub const LLM_RECOMMENDATION_KEYS: [&str; 2] = ["llm_recommendation", "llm_type"];
