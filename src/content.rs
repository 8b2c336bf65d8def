use serde::Serialize;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct SampleText {
    pub label: &'static str,
    pub text: &'static str,
}

pub const SAMPLES: &[SampleText] = &[
    SampleText {
        label: "Positive",
        text: "Just got promoted at work! Feeling blessed and grateful for this opportunity.",
    },
    SampleText {
        label: "Negative",
        text: "I feel like nobody cares anymore. I am so depressed. What's the point of trying?",
    },
];

#[derive(Clone, Copy, Debug, Serialize)]
pub struct SupportLine {
    pub region: &'static str,
    pub name: &'static str,
    pub contact: &'static str,
}

/// Returned alongside every high-risk result.
pub const SUPPORT_LINES: &[SupportLine] = &[
    SupportLine {
        region: "Kenya",
        name: "Kenya Red Cross",
        contact: "1199",
    },
    SupportLine {
        region: "Kenya",
        name: "Befrienders Kenya",
        contact: "+254 722 178 177",
    },
    SupportLine {
        region: "Kenya",
        name: "Lifeline Kenya",
        contact: "+254 20 272 1806",
    },
    SupportLine {
        region: "United States",
        name: "988 Suicide & Crisis Lifeline",
        contact: "988",
    },
    SupportLine {
        region: "United States",
        name: "Crisis Text Line",
        contact: "Text HOME to 741741",
    },
    SupportLine {
        region: "United Kingdom",
        name: "Samaritans",
        contact: "116 123",
    },
    SupportLine {
        region: "International",
        name: "International Association for Suicide Prevention",
        contact: "https://findahelpline.com",
    },
];

pub const DISCLAIMER: &str = "This tool is for informational purposes only. If you or someone you know is in crisis, please seek help immediately.";

pub fn sample(index: usize) -> Option<&'static SampleText> {
    SAMPLES.get(index)
}
