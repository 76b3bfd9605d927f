use crate::domain::models::PaletteMode;

/// Where the palette is in its life on one page. `Absent` means nothing is
/// mounted; `Hidden` keeps the mounted frame around only for the duration
/// of the fade-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Absent,
    Hidden,
    Visible(PaletteMode),
}

impl LifecycleState {
    pub fn visible(&self) -> bool {
        matches!(self, LifecycleState::Visible(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleDecision {
    Hide,
    Show(PaletteMode),
}

/// A toggle in the mode already showing hides; everything else shows the
/// requested mode, including flipping a visible palette to the other mode.
pub fn decide_toggle(state: LifecycleState, requested: PaletteMode) -> ToggleDecision {
    match state {
        LifecycleState::Visible(current) if current == requested => ToggleDecision::Hide,
        _ => ToggleDecision::Show(requested),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_in_same_mode_hides() {
        assert_eq!(
            decide_toggle(
                LifecycleState::Visible(PaletteMode::TabSwitcher),
                PaletteMode::TabSwitcher
            ),
            ToggleDecision::Hide
        );
    }

    #[test]
    fn toggle_in_other_mode_switches_without_hiding() {
        assert_eq!(
            decide_toggle(
                LifecycleState::Visible(PaletteMode::TabSwitcher),
                PaletteMode::General
            ),
            ToggleDecision::Show(PaletteMode::General)
        );
    }

    #[test]
    fn hidden_and_absent_always_show() {
        for state in [LifecycleState::Absent, LifecycleState::Hidden] {
            assert_eq!(
                decide_toggle(state, PaletteMode::General),
                ToggleDecision::Show(PaletteMode::General)
            );
        }
    }

    #[test]
    fn double_toggle_returns_to_hidden() {
        let mut state = LifecycleState::Absent;
        for _ in 0..2 {
            state = match decide_toggle(state, PaletteMode::General) {
                ToggleDecision::Show(mode) => LifecycleState::Visible(mode),
                ToggleDecision::Hide => LifecycleState::Hidden,
            };
        }
        assert_eq!(state, LifecycleState::Hidden);
    }
}
