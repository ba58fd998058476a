//! Rendering a session into a display view
//!
//! Pure functions: a session snapshot in, a view model out. Enemy HP stays
//! hidden (only "Down" is shown) so the display never spoils the narrator.

use serde::Serialize;

use crate::combat::{CombatPhase, CombatSession, CombatSummary};

/// Accent color while combat is running
pub const ACTIVE_COLOR: u32 = 0xFF4500;

/// Accent color once combat has ended
pub const ENDED_COLOR: u32 = 0x32CD32;

/// Most positions listed in the positions field
pub const MAX_POSITIONS_SHOWN: usize = 4;

const FOOTER: &str = "Auto-updated • DM controls HP and stats";

/// A named block of text inside a view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl ViewField {
    fn new(name: &str, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            inline,
        }
    }
}

/// Renderer output, handed to a publisher
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedView {
    pub title: String,
    pub description: Option<String>,
    pub color: u32,
    pub fields: Vec<ViewField>,
    pub footer: Option<String>,
}

impl RenderedView {
    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&ViewField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Plain-text rendering for text-only targets
    pub fn to_text(&self) -> String {
        let mut out = format!("== {} ==\n", self.title);
        if let Some(ref description) = self.description {
            out.push_str(description);
            out.push('\n');
        }
        for field in &self.fields {
            out.push_str(&format!("[{}]\n{}\n", field.name, field.value));
        }
        if let Some(ref footer) = self.footer {
            out.push_str(&format!("-- {}\n", footer));
        }
        out
    }
}

/// Render the live combat view
pub fn render(session: &CombatSession) -> RenderedView {
    let mut fields = Vec::new();

    let info = match session.phase() {
        CombatPhase::Active => format!("**Round:** {}\n**Phase:** Active", session.round()),
        phase => format!("**Phase:** {}", phase),
    };
    fields.push(ViewField::new("Combat Info", info, true));

    let lines = initiative_lines(session);
    if !lines.is_empty() {
        fields.push(ViewField::new("Initiative Order", lines.join("\n"), false));
    }

    if session.is_active() {
        if let Some(current) = session.current_combatant() {
            let kind = if current.is_player { "Player" } else { "NPC" };
            fields.push(ViewField::new(
                "Current Turn",
                format!("**{}** - {}", current.name, kind),
                true,
            ));
        }
    }

    let positions: Vec<String> = session
        .combatants_in_registration_order()
        .into_iter()
        .filter_map(|c| c.position.as_ref().map(|p| format!("{}: {}", c.name, p)))
        .take(MAX_POSITIONS_SHOWN)
        .collect();
    if !positions.is_empty() {
        fields.push(ViewField::new("Positions", positions.join(" • "), false));
    }

    RenderedView {
        title: "Combat Status".to_string(),
        description: None,
        color: ACTIVE_COLOR,
        fields,
        footer: Some(FOOTER.to_string()),
    }
}

/// Render the final view shown once combat is over
pub fn render_conclusion(summary: &CombatSummary) -> RenderedView {
    let rounds = if summary.rounds == 1 { "round" } else { "rounds" };
    RenderedView {
        title: "Combat Ended".to_string(),
        description: Some(format!(
            "The battle has concluded after {} {} with {} combatants.",
            summary.rounds, rounds, summary.combatant_count
        )),
        color: ENDED_COLOR,
        fields: Vec::new(),
        footer: None,
    }
}

fn initiative_lines(session: &CombatSession) -> Vec<String> {
    session
        .initiative_order()
        .iter()
        .enumerate()
        .filter_map(|(index, id)| {
            let c = session.combatant(id)?;
            let indicator = if session.is_active() && index == session.turn_index() {
                "▶"
            } else {
                "·"
            };
            let initiative = c
                .initiative
                .map(|i| i.to_string())
                .unwrap_or_else(|| "?".to_string());

            let health = match (c.is_player, c.current_hp, c.max_hp) {
                (true, Some(current), Some(max)) => format!(" ({}/{} HP)", current, max),
                (false, Some(current), _) if current <= 0 => " (Down)".to_string(),
                _ => String::new(),
            };

            let conditions = if c.conditions.is_empty() {
                String::new()
            } else {
                let names: Vec<String> = c.conditions.iter().map(|x| x.to_string()).collect();
                format!(" [{}]", names.join(", "))
            };

            Some(format!(
                "{} **{}** (Init {}){}{}",
                indicator, c.name, initiative, health, conditions
            ))
        })
        .collect()
}
