/// Single-turn instruction asking for one short prompt as strict JSON.
pub fn build_instruction(tone: &str, less_therapy: bool) -> String {
    let style = if less_therapy {
        "Stay away from therapy language and talking through feelings. Keep it light and playful."
    } else {
        "It may be thoughtful or heartfelt, but keep it simple."
    };

    [
        "Write one short conversation prompt for a couple to answer today.",
        "Reply with ONLY a JSON object of exactly this shape:",
        r#"{ "prompt": "..." }"#,
        "No markdown, no code fences, no other keys.",
        "The prompt must be answerable in a single sentence.",
        &format!("Tone: {}.", tone),
        style,
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use duet_types::models::Tone;

    #[test]
    fn mentions_tone_and_json_shape() {
        for tone in Tone::ALL.map(|t| t.as_str()).into_iter().chain(["romantic"]) {
            let text = build_instruction(tone, false);
            assert!(text.contains(&format!("Tone: {}.", tone)));
            assert!(text.contains(r#"{ "prompt": "..." }"#));
            assert!(text.contains("single sentence"));
        }
    }

    #[test]
    fn style_flag_changes_guidance() {
        let casual = build_instruction("deep", true);
        let earnest = build_instruction("deep", false);
        assert!(casual.contains("therapy language"));
        assert!(!earnest.contains("therapy language"));
        assert_ne!(casual, earnest);
    }
}
