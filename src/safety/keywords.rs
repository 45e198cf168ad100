//! Red-flag keyword sets for the emergency detector.
//!
//! Matching is lowercase substring containment over the user's message.
//! Keep entries lowercase and specific enough not to fire on routine
//! symptom talk.

pub static CHEST_PAIN_KEYWORDS: &[&str] = &[
    "chest pain",
    "crushing chest",
    "pressure in my chest",
    "chest pressure",
    "tightness in my chest",
    "pain in my chest",
];

pub static BREATHING_KEYWORDS: &[&str] = &[
    "shortness of breath",
    "short of breath",
    "trouble breathing",
    "hard to breathe",
    "difficulty breathing",
    "can't catch my breath",
];

pub static BREATHING_DISTRESS_KEYWORDS: &[&str] = &[
    "can't breathe",
    "cannot breathe",
    "struggling to breathe",
    "gasping for air",
    "turning blue",
    "lips are blue",
    "lips turning blue",
];

pub static STROKE_KEYWORDS: &[&str] = &[
    "face drooping",
    "face is drooping",
    "slurred speech",
    "slurring",
    "can't speak",
    "sudden weakness on one side",
    "weakness on one side",
    "numb on one side",
    "one side of my body",
    "one side of her body",
    "one side of his body",
];

pub static ANAPHYLAXIS_KEYWORDS: &[&str] = &[
    "throat is closing",
    "throat closing",
    "tongue is swelling",
    "tongue swelling",
    "swelling up after",
    "hives all over",
    "anaphyla",
];

pub static UNRESPONSIVE_KEYWORDS: &[&str] = &[
    "unconscious",
    "unresponsive",
    "not responding",
    "passed out and",
    "won't wake",
    "will not wake",
    "went limp",
    "gone limp",
    "body is limp",
];

pub static SEIZURE_KEYWORDS: &[&str] = &[
    "seizure",
    "convulsion",
    "convulsing",
    "shaking uncontrollably",
];

pub static BLEEDING_KEYWORDS: &[&str] = &[
    "won't stop bleeding",
    "will not stop bleeding",
    "bleeding heavily",
    "bleeding a lot",
    "blood everywhere",
    "soaked in blood",
];

// Intent phrasing only: "hurt myself" alone reads as accidental injury
// talk ("I hurt myself playing football") and must not fire here.
pub static SELF_HARM_KEYWORDS: &[&str] = &[
    "suicid",
    "want to die",
    "end my life",
    "kill myself",
    "want to hurt myself",
    "thinking of hurting myself",
    "harm myself",
    "no reason to live",
];

pub static FEVER_KEYWORDS: &[&str] = &[
    "fever",
    "temperature",
    "burning up",
    "feels hot",
];
