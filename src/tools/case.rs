//! Case transforms.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseTransform {
    Upper,
    Lower,
    Invert,
}

impl CaseTransform {
    pub fn apply(self, text: &str) -> String {
        match self {
            CaseTransform::Upper => text.to_uppercase(),
            CaseTransform::Lower => text.to_lowercase(),
            CaseTransform::Invert => invert_case(text),
        }
    }
}

/// Lowercase letters become uppercase, everything else lowercase
pub fn invert_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_lowercase() {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}
