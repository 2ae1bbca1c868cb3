use super::{PanelButton, TransportPanel};
use crate::config::{MAX_BPM, MIN_BPM};
use crate::state::ClockSnapshot;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

pub use dialoguer::Error as PromptError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelChoice {
    Press(PanelButton),
    SetBpm,
    Quit,
}

/// Menu entries for the current panel state, in display order
pub fn panel_choices(panel: &TransportPanel) -> Vec<PanelChoice> {
    let mut choices: Vec<PanelChoice> = panel
        .enabled_buttons()
        .into_iter()
        .map(PanelChoice::Press)
        .collect();
    choices.push(PanelChoice::SetBpm);
    choices.push(PanelChoice::Quit);
    choices
}

fn choice_label(choice: PanelChoice, snapshot: &ClockSnapshot) -> String {
    match choice {
        PanelChoice::Press(button) => button.title().to_string(),
        PanelChoice::SetBpm => format!("Set BPM (now {:.1})", snapshot.bpm),
        PanelChoice::Quit => "Quit".to_string(),
    }
}

pub fn choose_action(
    panel: &TransportPanel,
    snapshot: &ClockSnapshot,
    status: &str,
) -> Result<PanelChoice, PromptError> {
    let choices = panel_choices(panel);
    let labels: Vec<String> = choices
        .iter()
        .map(|choice| choice_label(*choice, snapshot))
        .collect();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(status)
        .items(&labels)
        .default(0)
        .interact_opt()?;

    Ok(selection
        .and_then(|index| choices.get(index).copied())
        .unwrap_or(PanelChoice::Quit))
}

pub fn validate_bpm(bpm: &f64) -> Result<(), String> {
    if bpm.is_finite() && (MIN_BPM..=MAX_BPM).contains(bpm) {
        Ok(())
    } else {
        Err(format!("BPM must be between {} and {}", MIN_BPM, MAX_BPM))
    }
}

pub fn prompt_bpm(current: f64) -> Result<f64, PromptError> {
    Input::<f64>::with_theme(&ColorfulTheme::default())
        .with_prompt("BPM")
        .default(current)
        .validate_with(validate_bpm)
        .interact_text()
}

/// Lets the user pick an output port; `None` means publish a virtual source.
pub fn select_output_port(ports: &[String]) -> Result<Option<String>, PromptError> {
    let mut items = vec!["Virtual source (other apps connect to us)".to_string()];
    items.extend(ports.iter().cloned());

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Send MIDI clock to")
        .items(&items)
        .default(0)
        .interact_opt()?;

    Ok(match selection {
        Some(index) if index > 0 => ports.get(index - 1).cloned(),
        _ => None,
    })
}
