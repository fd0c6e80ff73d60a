//! Canned replies used when a responder cannot produce one
//!
//! The categorizer is pure: the same input always maps to the same category,
//! and categories are checked in declaration order so the first match wins.

/// Topic buckets recognised by the keyword categorizer, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackCategory {
    Cancer,
    Diabetes,
    Depression,
    Symptoms,
    Medication,
    Emergency,
    General,
}

const KEYWORD_TABLE: &[(FallbackCategory, &[&str])] = &[
    (FallbackCategory::Cancer, &["cancer", "tumor", "malignant"]),
    (FallbackCategory::Diabetes, &["diabetes", "blood sugar", "insulin"]),
    (FallbackCategory::Depression, &["depression", "mental health", "mood"]),
    (FallbackCategory::Symptoms, &["symptom", "pain", "hurt", "ache"]),
    (FallbackCategory::Medication, &["medication", "drug", "pill", "medicine"]),
    (FallbackCategory::Emergency, &["emergency", "urgent", "critical"]),
];

/// Reply returned by the hosted responder when the remote API is unusable
pub const HOSTED_UNAVAILABLE_REPLY: &str = "I'm sorry, I'm having trouble connecting right now. Please consult a healthcare professional for medical advice.";

impl FallbackCategory {
    /// Classify a prompt by case-insensitive substring match
    pub fn classify(prompt: &str) -> Self {
        let lowered = prompt.to_lowercase();
        KEYWORD_TABLE
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
            .map(|(category, _)| *category)
            .unwrap_or(FallbackCategory::General)
    }

    /// Canned text for this category
    pub fn reply(&self) -> &'static str {
        match self {
            FallbackCategory::Cancer => "The main causes of cancer include genetic factors, environmental exposures (like tobacco, radiation, chemicals), lifestyle factors (diet, physical inactivity), and infections. Risk factors vary by cancer type. Early detection through screening is important.",
            FallbackCategory::Diabetes => "Diabetes is caused by insufficient insulin production (Type 1) or insulin resistance (Type 2). Risk factors include genetics, obesity, poor diet, physical inactivity, and age. Type 2 diabetes is largely preventable through lifestyle changes.",
            FallbackCategory::Depression => "Depression can be caused by biological factors (brain chemistry, genetics), psychological factors (trauma, stress), and environmental factors (life events, social isolation). It's a treatable medical condition.",
            FallbackCategory::Symptoms => "I understand you're asking about symptoms. While I can provide general information, it's important to consult with a healthcare professional for proper diagnosis and treatment.",
            FallbackCategory::Medication => "For medication questions, please consult with a pharmacist or healthcare provider as they can provide personalized advice based on your specific situation.",
            FallbackCategory::Emergency => "If you're experiencing a medical emergency, please call emergency services immediately (911 in the US).",
            FallbackCategory::General => "I'm here to provide general medical information, but please remember to consult with healthcare professionals for personalized medical advice.",
        }
    }
}

/// Keyword-matched canned reply for `prompt`
pub fn keyword_reply(prompt: &str) -> &'static str {
    FallbackCategory::classify(prompt).reply()
}
