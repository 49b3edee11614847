use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of word a genome slot asks the expression service to produce.
///
/// The category of a role is its name up to the first underscore
/// (`noun_food` -> `noun`); mutation uses it to find related roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticRole {
    // Living things
    Animal,
    MythicalCreature,
    Person,
    Profession,
    Celebrity,
    // Actions
    ActionVerb,
    EmotionVerb,
    MotionVerb,
    ThinkingVerb,
    // Descriptors
    AdjectiveColor,
    AdjectiveSize,
    AdjectiveEmotion,
    AdjectiveQuality,
    AdjectiveFunny,
    AdjectiveScary,
    // Objects and places
    NounObject,
    NounPlace,
    NounFood,
    NounNature,
    NounBuilding,
    // Abstract
    AbstractConcept,
    BodyPart,
    Tool,
    Vehicle,
    Weather,
    TimePeriod,
    NumberWord,
    Sound,
    Material,
}

impl SemanticRole {
    pub const ALL: [SemanticRole; 29] = [
        SemanticRole::Animal,
        SemanticRole::MythicalCreature,
        SemanticRole::Person,
        SemanticRole::Profession,
        SemanticRole::Celebrity,
        SemanticRole::ActionVerb,
        SemanticRole::EmotionVerb,
        SemanticRole::MotionVerb,
        SemanticRole::ThinkingVerb,
        SemanticRole::AdjectiveColor,
        SemanticRole::AdjectiveSize,
        SemanticRole::AdjectiveEmotion,
        SemanticRole::AdjectiveQuality,
        SemanticRole::AdjectiveFunny,
        SemanticRole::AdjectiveScary,
        SemanticRole::NounObject,
        SemanticRole::NounPlace,
        SemanticRole::NounFood,
        SemanticRole::NounNature,
        SemanticRole::NounBuilding,
        SemanticRole::AbstractConcept,
        SemanticRole::BodyPart,
        SemanticRole::Tool,
        SemanticRole::Vehicle,
        SemanticRole::Weather,
        SemanticRole::TimePeriod,
        SemanticRole::NumberWord,
        SemanticRole::Sound,
        SemanticRole::Material,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticRole::Animal => "animal",
            SemanticRole::MythicalCreature => "mythical_creature",
            SemanticRole::Person => "person",
            SemanticRole::Profession => "profession",
            SemanticRole::Celebrity => "celebrity",
            SemanticRole::ActionVerb => "action_verb",
            SemanticRole::EmotionVerb => "emotion_verb",
            SemanticRole::MotionVerb => "motion_verb",
            SemanticRole::ThinkingVerb => "thinking_verb",
            SemanticRole::AdjectiveColor => "adjective_color",
            SemanticRole::AdjectiveSize => "adjective_size",
            SemanticRole::AdjectiveEmotion => "adjective_emotion",
            SemanticRole::AdjectiveQuality => "adjective_quality",
            SemanticRole::AdjectiveFunny => "adjective_funny",
            SemanticRole::AdjectiveScary => "adjective_scary",
            SemanticRole::NounObject => "noun_object",
            SemanticRole::NounPlace => "noun_place",
            SemanticRole::NounFood => "noun_food",
            SemanticRole::NounNature => "noun_nature",
            SemanticRole::NounBuilding => "noun_building",
            SemanticRole::AbstractConcept => "abstract_concept",
            SemanticRole::BodyPart => "body_part",
            SemanticRole::Tool => "tool",
            SemanticRole::Vehicle => "vehicle",
            SemanticRole::Weather => "weather",
            SemanticRole::TimePeriod => "time_period",
            SemanticRole::NumberWord => "number_word",
            SemanticRole::Sound => "sound",
            SemanticRole::Material => "material",
        }
    }

    pub fn category(&self) -> &'static str {
        let name = self.as_str();
        name.split('_').next().unwrap_or(name)
    }

    /// All roles sharing this role's category, itself included.
    pub fn related(&self) -> Vec<SemanticRole> {
        let category = self.category();
        Self::ALL
            .iter()
            .copied()
            .filter(|r| r.category() == category)
            .collect()
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> SemanticRole {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Roles the fitness heuristics treat as a sentence subject.
    pub fn is_noun_like(&self) -> bool {
        let name = self.as_str();
        name.contains("noun") || name.contains("person") || name.contains("animal")
    }

    pub fn is_verb_like(&self) -> bool {
        self.as_str().contains("verb")
    }

    pub fn is_adjective_like(&self) -> bool {
        self.as_str().contains("adjective")
    }

    pub fn is_concrete(&self) -> bool {
        const CONCRETE: [&str; 6] = ["animal", "noun_object", "noun_food", "person", "vehicle", "tool"];
        let name = self.as_str();
        CONCRETE.iter().any(|c| name.contains(c))
    }

    /// Human-readable label used in prompts ("action verb").
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for SemanticRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
