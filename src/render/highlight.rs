/// Medical terms called out in model replies. Matching is case-sensitive.
pub const HIGHLIGHT_TERMS: [&str; 8] = [
    "Diabetes",
    "Insulin",
    "Symptoms",
    "Treatment",
    "Diagnosis",
    "Hypertension",
    "Cancer",
    "Asthma",
];

/// Wrap every occurrence of each term in a `highlighted-term` span.
///
/// Plain substring replacement: "Symptoms" inside "Common Symptoms" is
/// highlighted, "symptoms" is not.
pub fn highlight_terms(text: &str) -> String {
    HIGHLIGHT_TERMS.iter().fold(text.to_string(), |acc, term| {
        acc.replace(term, &format!(r#"<span class="highlighted-term">{}</span>"#, term))
    })
}
