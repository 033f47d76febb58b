//! Malformed payload corpus
//!
//! Every entry must be rejected by the decoder. Used by the receiver
//! robustness tests and as a seed corpus for fuzzing.

/// A named payload that must never decode
#[derive(Clone, Debug)]
pub struct MalformedCase {
    pub name: &'static str,
    pub bytes: Vec<u8>,
}

impl MalformedCase {
    fn new(name: &'static str, bytes: impl Into<Vec<u8>>) -> Self {
        MalformedCase {
            name,
            bytes: bytes.into(),
        }
    }
}

/// Payloads covering each rejection path of the decoder
pub fn malformed_corpus() -> Vec<MalformedCase> {
    let valid = br#"{"pose":[[0.5,0.5,0.0],[0.4,0.6,-0.1]],"left_hand":null}"#;

    vec![
        MalformedCase::new("empty", Vec::new()),
        MalformedCase::new("whitespace", "  \n\t "),
        MalformedCase::new("invalid_utf8", vec![0x7b, 0xff, 0xfe, 0x7d]),
        MalformedCase::new("lone_continuation", vec![0x80, 0x80]),
        MalformedCase::new("not_json", "hello rig"),
        MalformedCase::new("top_level_array", "[[0.1,0.2,0.3]]"),
        MalformedCase::new("top_level_number", "42"),
        MalformedCase::new("top_level_null", "null"),
        MalformedCase::new("truncated", &valid[..valid.len() / 2]),
        MalformedCase::new("unterminated_object", r#"{"pose":[[0.1,0.2,0.3]]"#),
        MalformedCase::new("pose_not_array", r#"{"pose":"yes"}"#),
        MalformedCase::new("pose_object", r#"{"pose":{"x":0.1}}"#),
        MalformedCase::new("triple_too_short", r#"{"pose":[[0.1,0.2]]}"#),
        MalformedCase::new("triple_too_long", r#"{"pose":[[0.1,0.2,0.3,0.4]]}"#),
        MalformedCase::new("triple_string", r#"{"left_hand":[["0.1",0.2,0.3]]}"#),
        MalformedCase::new("triple_null_component", r#"{"right_hand":[[0.1,null,0.3]]}"#),
        MalformedCase::new("overflow_f32", r#"{"pose":[[1e39,0.2,0.3]]}"#),
        MalformedCase::new("overflow_f64", r#"{"pose":[[0.1,1e400,0.3]]}"#),
        MalformedCase::new("nan_literal", r#"{"pose":[[NaN,0.2,0.3]]}"#),
        MalformedCase::new("metrics_not_object", r#"{"metrics":[1,2,3]}"#),
        MalformedCase::new("metrics_overflow", r#"{"metrics":{"fps":-1e39}}"#),
        MalformedCase::new("trailing_garbage", r#"{"pose":null} trailing"#),
        MalformedCase::new("binary_noise", (0u8..=255).rev().collect::<Vec<u8>>()),
    ]
}
