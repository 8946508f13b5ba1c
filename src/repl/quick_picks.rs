//! Numbered shortcuts that turn a few answers into a full prompt

use thiserror::Error;

/// A follow-up question asked by a quick pick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub label: &'static str,
    pub required: bool,
}

const fn required(label: &'static str) -> Question {
    Question { label, required: true }
}

const fn optional(label: &'static str) -> Question {
    Question { label, required: false }
}

/// Why a quick pick could not build its prompt
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuickPickError {
    #[error("No URL provided.")]
    MissingUrl,
    #[error("No product description provided.")]
    MissingProduct,
    #[error("Both URLs are required.")]
    MissingUrls,
}

const ANALYZE_HOMEPAGE: &[Question] = &[required("Enter homepage URL: ")];
const FIVE_SECOND_TEST: &[Question] = &[required("Enter URL to test: ")];
const ANTI_PATTERNS: &[Question] = &[required("Enter URL to scan: ")];
const POSITIONING_CANVAS: &[Question] = &[
    required("Describe your product: "),
    optional("Who is it for? (optional): "),
    optional("Competitors? (optional, comma-separated): "),
];
const MESSAGING_FRAMEWORK: &[Question] = &[required("Describe your product: ")];
const COMPETITOR_COMPARE: &[Question] = &[
    required("Your homepage URL: "),
    required("Competitor URL: "),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickPick {
    AnalyzeHomepage,
    FiveSecondTest,
    AntiPatterns,
    PositioningCanvas,
    MessagingFramework,
    CompetitorCompare,
}

impl QuickPick {
    pub const ALL: [QuickPick; 6] = [
        QuickPick::AnalyzeHomepage,
        QuickPick::FiveSecondTest,
        QuickPick::AntiPatterns,
        QuickPick::PositioningCanvas,
        QuickPick::MessagingFramework,
        QuickPick::CompetitorCompare,
    ];

    /// Look up a pick by the number typed at the prompt
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .iter()
            .find(|pick| pick.key().to_string() == key)
            .copied()
    }

    pub fn key(&self) -> usize {
        Self::ALL.iter().position(|p| p == self).map(|i| i + 1).unwrap_or(0)
    }

    pub fn title(&self) -> &'static str {
        match self {
            QuickPick::AnalyzeHomepage => "Analyze a homepage URL",
            QuickPick::FiveSecondTest => "Run a 5-second test",
            QuickPick::AntiPatterns => "Detect anti-patterns",
            QuickPick::PositioningCanvas => "Create positioning canvas",
            QuickPick::MessagingFramework => "Build messaging framework",
            QuickPick::CompetitorCompare => "Compare against competitor",
        }
    }

    pub fn questions(&self) -> &'static [Question] {
        match self {
            QuickPick::AnalyzeHomepage => ANALYZE_HOMEPAGE,
            QuickPick::FiveSecondTest => FIVE_SECOND_TEST,
            QuickPick::AntiPatterns => ANTI_PATTERNS,
            QuickPick::PositioningCanvas => POSITIONING_CANVAS,
            QuickPick::MessagingFramework => MESSAGING_FRAMEWORK,
            QuickPick::CompetitorCompare => COMPETITOR_COMPARE,
        }
    }

    /// Build the prompt from answers given in question order
    pub fn build_prompt(&self, answers: &[String]) -> Result<String, QuickPickError> {
        let answer = |i: usize| answers.get(i).map(|a| a.trim()).unwrap_or("");

        match self {
            QuickPick::AnalyzeHomepage => {
                let url = non_empty(answer(0), QuickPickError::MissingUrl)?;
                Ok(audit_prompt(url))
            }
            QuickPick::FiveSecondTest => {
                let url = non_empty(answer(0), QuickPickError::MissingUrl)?;
                Ok(format!(
                    "Run a 5-second test on {url}. Tell me: What do they do? Who is it for? \
                     What makes them different? What should I do next?"
                ))
            }
            QuickPick::AntiPatterns => {
                let url = non_empty(answer(0), QuickPickError::MissingUrl)?;
                Ok(format!(
                    "Scan {url} for PMM anti-patterns. Look for: unclear positioning, jargon, \
                     feature dumping, missing social proof, too many CTAs."
                ))
            }
            QuickPick::PositioningCanvas => {
                let product = non_empty(answer(0), QuickPickError::MissingProduct)?;
                let audience = Some(answer(1)).filter(|a| !a.is_empty());
                let competitors = Some(answer(2)).filter(|c| !c.is_empty());
                Ok(positioning_prompt(product, audience, competitors))
            }
            QuickPick::MessagingFramework => {
                let product = non_empty(answer(0), QuickPickError::MissingProduct)?;
                Ok(format!(
                    "Create a complete messaging framework for: {product}. Include value \
                     proposition, 3 key message pillars, and proof points."
                ))
            }
            QuickPick::CompetitorCompare => {
                let (ours, theirs) = (answer(0), answer(1));
                if ours.is_empty() || theirs.is_empty() {
                    return Err(QuickPickError::MissingUrls);
                }
                Ok(format!(
                    "Compare my homepage ({ours}) against this competitor ({theirs}). Identify \
                     their weaknesses and my differentiation opportunities."
                ))
            }
        }
    }
}

fn non_empty(value: &str, err: QuickPickError) -> Result<&str, QuickPickError> {
    if value.is_empty() {
        Err(err)
    } else {
        Ok(value)
    }
}

/// Full audit of one homepage
pub fn audit_prompt(url: &str) -> String {
    format!(
        "Run a complete PMM audit on {url}. Include 5-second test, positioning analysis, \
         messaging analysis, and anti-pattern detection."
    )
}

/// Positioning canvas with optional audience and competitors
pub fn positioning_prompt(product: &str, audience: Option<&str>, competitors: Option<&str>) -> String {
    let mut prompt = format!("Create a positioning canvas for: {product}");
    if let Some(audience) = audience {
        prompt.push_str(&format!("\nTarget audience: {audience}"));
    }
    if let Some(competitors) = competitors {
        prompt.push_str(&format!("\nCompetitors: {competitors}"));
    }
    prompt
}

/// Landscape comparison against several competitors
pub fn compare_prompt(your_url: &str, competitor_urls: &[String]) -> String {
    let competitor_list = competitor_urls
        .iter()
        .map(|url| format!("- {url}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze my homepage ({your_url}) against these competitors:\n\
         {competitor_list}\n\
         \n\
         For each competitor:\n\
         1. Analyze their positioning and messaging\n\
         2. Identify their weaknesses\n\
         3. Find differentiation opportunities for me\n\
         \n\
         Then provide:\n\
         - Overall competitive landscape summary\n\
         - My unique positioning opportunities\n\
         - \"Unlike X, we Y\" statements for each competitor\n\
         - Recommended positioning angle\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_from_key() {
        assert_eq!(QuickPick::from_key("2"), Some(QuickPick::FiveSecondTest));
        assert_eq!(QuickPick::from_key(" 6 "), Some(QuickPick::CompetitorCompare));
        assert_eq!(QuickPick::from_key("0"), None);
        assert_eq!(QuickPick::from_key("7"), None);
        assert_eq!(QuickPick::from_key("x"), None);
        assert_eq!(QuickPick::from_key("+3"), None);
        assert_eq!(QuickPick::from_key("03"), None);
        assert_eq!(QuickPick::CompetitorCompare.key(), 6);
    }

    #[test]
    fn test_questions_per_pick() {
        assert_eq!(QuickPick::AnalyzeHomepage.questions()[0].label, "Enter homepage URL: ");
        let canvas = QuickPick::PositioningCanvas.questions();
        assert_eq!(canvas.len(), 3);
        assert!(canvas[0].required);
        assert!(!canvas[1].required && !canvas[2].required);
        assert!(QuickPick::CompetitorCompare.questions().iter().all(|q| q.required));
    }

    #[test]
    fn test_five_second_test_prompt() {
        let prompt = QuickPick::FiveSecondTest
            .build_prompt(&answers(&["https://example.com"]))
            .unwrap();
        assert!(prompt.starts_with("Run a 5-second test on https://example.com."));
        assert!(prompt.contains("What should I do next?"));
    }

    #[test]
    fn test_missing_required_answers() {
        assert_eq!(
            QuickPick::AnalyzeHomepage.build_prompt(&answers(&["  "])),
            Err(QuickPickError::MissingUrl)
        );
        assert_eq!(
            QuickPick::MessagingFramework.build_prompt(&[]),
            Err(QuickPickError::MissingProduct)
        );
        assert_eq!(
            QuickPick::CompetitorCompare.build_prompt(&answers(&["https://a.io", ""])),
            Err(QuickPickError::MissingUrls)
        );
        assert_eq!(QuickPickError::MissingUrls.to_string(), "Both URLs are required.");
    }

    #[test]
    fn test_positioning_optional_lines() {
        let bare = QuickPick::PositioningCanvas
            .build_prompt(&answers(&["Invoice OCR API", "", ""]))
            .unwrap();
        assert_eq!(bare, "Create a positioning canvas for: Invoice OCR API");

        let full = QuickPick::PositioningCanvas
            .build_prompt(&answers(&["Invoice OCR API", "AP teams", "Rossum, Nanonets"]))
            .unwrap();
        assert!(full.ends_with("\nTarget audience: AP teams\nCompetitors: Rossum, Nanonets"));
    }

    #[test]
    fn test_compare_prompt_lists_competitors() {
        let prompt = compare_prompt(
            "https://ours.io",
            &["https://a.io".to_string(), "https://b.io".to_string()],
        );
        assert!(prompt.starts_with("Analyze my homepage (https://ours.io) against these competitors:\n- https://a.io\n- https://b.io\n"));
        assert!(prompt.contains("\"Unlike X, we Y\""));
    }
}
