//! Idea board: the single owner of an idea collection and its scoring settings.
//!
//! The scoring functions are pure and keep nothing between calls. The board
//! holds the mutable state (ideas, model, weights, threshold mode), applies
//! edits and suggestions with the provenance rules, and hands snapshots of
//! its ideas to the engine when asked for a ranking or a classification.
//! Callers that share a board across threads must serialize access themselves.

use crate::models::{Idea, IdeaFields, Impact, ScoringField, ScoringModel, Weights};
use crate::scoring::{self, Assessment, Classification, RankedIdea, ThresholdMode};
use crate::{Error, Result};

/// A user edit to one field of an idea.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Title(String),
    Notes(Option<String>),
    Tags(Vec<String>),
    Reach(Option<f64>),
    Impact(Option<Impact>),
    Confidence(Option<f64>),
    Effort(Option<f64>),
}

/// Values proposed by an automated suggester. Absent values are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suggestion {
    pub reach: Option<f64>,
    pub impact: Option<Impact>,
    pub confidence: Option<f64>,
    pub effort: Option<f64>,
}

/// An idea collection plus the settings used to score it.
#[derive(Debug, Clone, Default)]
pub struct IdeaBoard {
    ideas: Vec<Idea>,
    model: ScoringModel,
    weights: Weights,
    thresholds: ThresholdMode,
}

impl IdeaBoard {
    pub fn new(model: ScoringModel, weights: Weights) -> Self {
        Self {
            ideas: Vec::new(),
            model,
            weights,
            thresholds: ThresholdMode::default(),
        }
    }

    /// Build a board around existing ideas.
    pub fn with_ideas(ideas: Vec<Idea>, model: ScoringModel, weights: Weights) -> Self {
        Self {
            ideas,
            ..Self::new(model, weights)
        }
    }

    pub fn ideas(&self) -> &[Idea] {
        &self.ideas
    }

    pub fn model(&self) -> ScoringModel {
        self.model
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn set_model(&mut self, model: ScoringModel) {
        self.model = model;
    }

    /// Replace the weights. Rejects non-positive or non-finite values.
    pub fn set_weights(&mut self, weights: Weights) -> Result<()> {
        weights.validate().map_err(Error::InvalidInput)?;
        self.weights = weights;
        Ok(())
    }

    pub fn set_thresholds(&mut self, mode: ThresholdMode) {
        self.thresholds = mode;
    }

    pub fn get(&self, id: &str) -> Option<&Idea> {
        self.ideas.iter().find(|idea| idea.id == id)
    }

    /// Add a new idea typed by the user and return its id.
    pub fn create(&mut self, fields: IdeaFields) -> String {
        let idea = Idea::new(fields);
        let id = idea.id.clone();
        tracing::debug!(id = %id, "idea created");
        self.ideas.push(idea);
        id
    }

    /// Delete an idea, returning it.
    pub fn remove(&mut self, id: &str) -> Result<Idea> {
        let index = self.index_of(id)?;
        Ok(self.ideas.remove(index))
    }

    /// Apply a user edit and return the re-derived score and status.
    ///
    /// Changing a scoring field that a suggester set marks it `ai-edited`.
    pub fn edit(&mut self, id: &str, edit: FieldEdit) -> Result<Assessment> {
        let index = self.index_of(id)?;
        let fields = &mut self.ideas[index].fields;

        match edit {
            FieldEdit::Title(title) => fields.title = title,
            FieldEdit::Notes(notes) => fields.notes = notes,
            FieldEdit::Tags(tags) => {
                fields.tags.clear();
                fields.add_tags(tags);
            }
            FieldEdit::Reach(value) => set_by_user(fields, ScoringField::Reach, value),
            FieldEdit::Impact(value) => {
                set_by_user(fields, ScoringField::Impact, value.map(Impact::value))
            }
            FieldEdit::Confidence(value) => set_by_user(fields, ScoringField::Confidence, value),
            FieldEdit::Effort(value) => set_by_user(fields, ScoringField::Effort, value),
        }

        Ok(self.assess_at(index))
    }

    /// Apply suggested values, tagging each one `ai`.
    pub fn apply_suggestion(&mut self, id: &str, suggestion: Suggestion) -> Result<Assessment> {
        let index = self.index_of(id)?;
        let fields = &mut self.ideas[index].fields;

        let values = [
            (ScoringField::Reach, suggestion.reach),
            (ScoringField::Impact, suggestion.impact.map(Impact::value)),
            (ScoringField::Confidence, suggestion.confidence),
            (ScoringField::Effort, suggestion.effort),
        ];
        for (field, value) in values {
            if let Some(value) = value {
                store(fields, field, Some(value));
                fields.provenance.record_suggestion(field);
            }
        }

        Ok(self.assess_at(index))
    }

    /// Current score and status of one idea.
    pub fn assess(&self, id: &str) -> Result<Assessment> {
        let index = self.index_of(id)?;
        Ok(self.assess_at(index))
    }

    /// Rank a snapshot of the collection with the board's settings.
    pub fn ranked(&self) -> Vec<RankedIdea<'_>> {
        scoring::rank(&self.ideas, self.model, &self.weights)
    }

    /// Classify a snapshot of the collection with the board's settings.
    pub fn quadrants(&self) -> Classification {
        scoring::classify(&self.ideas, self.model, self.thresholds)
    }

    fn assess_at(&self, index: usize) -> Assessment {
        scoring::assess(&self.ideas[index].fields, self.model, &self.weights)
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.ideas
            .iter()
            .position(|idea| idea.id == id)
            .ok_or_else(|| Error::NotFound(format!("idea {}", id)))
    }
}

/// Set a scoring field on behalf of the user and update its provenance.
fn set_by_user(fields: &mut IdeaFields, field: ScoringField, value: Option<f64>) {
    match value {
        None => {
            store(fields, field, None);
            fields.provenance.clear(field);
        }
        Some(value) => {
            let changed = fields.value(field) != Some(value);
            store(fields, field, Some(value));
            fields.provenance.record_user_edit(field, changed);
        }
    }
}

fn store(fields: &mut IdeaFields, field: ScoringField, value: Option<f64>) {
    match field {
        ScoringField::Reach => fields.reach = value,
        ScoringField::Impact => fields.impact = value.and_then(Impact::from_value),
        ScoringField::Confidence => fields.confidence = value,
        ScoringField::Effort => fields.effort = value,
    }
}
