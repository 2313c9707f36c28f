//! Prompt construction for one chunk of reviews.

pub(crate) const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Build the user prompt asking for per-attribute sentiment of `chunk`.
///
/// The prompt names the entity, lists the attributes, fixes the `-1..=1`
/// scoring convention, and demands a bare JSON object as the reply. The
/// chunk text is appended last.
#[must_use]
pub fn build_prompt<S: AsRef<str>>(entity: &str, attributes: &[S], chunk: &str) -> String {
    let attribute_list = attributes
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Analyze the following reviews for the entity '{entity}' and provide probabilities \
         for the following attributes as a JSON object with values ranging from -1 to 1: \
         {attribute_list}.\n\
         \n\
         -1 means the sentiment of that attribute is negative.\n\
         1 means the sentiment of that attribute is positive.\n\
         0 means the attribute isn't talked about or the sentiment is neutral.\n\
         \n\
         Respond with a single JSON object only, using the attribute names as keys, like this:\n\
         {{\"attribute_1\": -0.3, \"attribute_2\": 0.7}}\n\
         \n\
         Reviews: {chunk}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_entity_and_attributes() {
        let prompt = build_prompt("Acme Lens", &["clarity", "price"], "Sharp but pricey.");
        assert!(prompt.contains("'Acme Lens'"));
        assert!(prompt.contains("clarity, price."));
    }

    #[test]
    fn prompt_states_scoring_convention() {
        let prompt = build_prompt("X", &["a"], "");
        assert!(prompt.contains("-1 means the sentiment of that attribute is negative"));
        assert!(prompt.contains("1 means the sentiment of that attribute is positive"));
        assert!(prompt.contains("0 means the attribute isn't talked about"));
        assert!(prompt.contains(r#"{"attribute_1": -0.3, "attribute_2": 0.7}"#));
    }

    #[test]
    fn chunk_text_is_appended_last() {
        let prompt = build_prompt("X", &["a"], "the chunk body");
        assert!(prompt.ends_with("Reviews: the chunk body"));
    }

    #[test]
    fn empty_chunk_still_builds_prompt() {
        let prompt = build_prompt("X", &["a", "b"], "");
        assert!(prompt.ends_with("Reviews: "));
    }
}
