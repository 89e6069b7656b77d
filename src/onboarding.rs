//! Business categories offered during onboarding and the wizard's step rules.

use crate::error::{Error, Result};
use crate::model::Onboarding;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub name: &'static str,
    pub subcategories: &'static [&'static str],
}

pub const CATEGORIES: &[Category] = &[Category {
    name: "Beauty & Wellness",
    subcategories: &[
        "Salons / Parlours",
        "Spas & Wellness Centers",
        "Tattoo Studios",
        "Ayurvedic Clinics",
        "Massage Centers",
        "Nail Studios",
        "Skincare Clinics",
        "Hair Product Stores",
    ],
}];

pub fn category(name: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.name == name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Category,
    Subcategories,
    Account,
}

impl Step {
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Category => Some(Self::Subcategories),
            Self::Subcategories => Some(Self::Account),
            Self::Account => None,
        }
    }
}

/// Whether the wizard may leave `step` with the current answers.
pub fn can_proceed(step: Step, answers: &Onboarding) -> bool {
    match step {
        Step::Category => !answers.category.is_empty(),
        Step::Subcategories => !answers.subcategories.is_empty(),
        Step::Account => true,
    }
}

/// Choosing a different category drops sub-categories that belong to the old one.
pub fn choose_category(answers: &Onboarding, name: &str) -> Onboarding {
    let mut next = answers.clone();
    if next.category != name {
        next.subcategories.clear();
    }
    next.category = name.to_owned();
    next
}

pub fn toggle_subcategory(answers: &Onboarding, sub: &str) -> Onboarding {
    let mut next = answers.clone();
    if let Some(pos) = next.subcategories.iter().position(|s| s == sub) {
        next.subcategories.remove(pos);
    } else {
        next.subcategories.push(sub.to_owned());
    }
    next
}

/// Empty answers are accepted (onboarding not done yet); anything chosen must
/// come from the catalog.
pub fn validate(answers: &Onboarding) -> Result<()> {
    if answers.category.is_empty() {
        if answers.subcategories.is_empty() {
            return Ok(());
        }
        return Err(Error::validation("Choose a business category first."));
    }
    let Some(category) = category(&answers.category) else {
        return Err(Error::validation(format!(
            "Unknown business category: {}",
            answers.category
        )));
    };
    if let Some(stray) = answers
        .subcategories
        .iter()
        .find(|s| !category.subcategories.iter().any(|known| *known == s.as_str()))
    {
        return Err(Error::validation(format!(
            "{stray} is not part of {}",
            category.name
        )));
    }
    Ok(())
}
