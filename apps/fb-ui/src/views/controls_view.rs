use fb_controls::ParamKind;

use crate::state::DashboardState;

#[derive(Default)]
pub struct ControlsView;

impl ControlsView {
    /// Draw the parameter sliders. Returns `true` when any parameter changed.
    pub fn show(&mut self, ui: &mut egui::Ui, state: &mut DashboardState) -> bool {
        let mut changed = false;

        ui.heading("Parameters");
        ui.separator();

        let sliders = state.config.sliders.clone();
        for slider in &sliders {
            let range = &slider.range;
            let mut value = state.params().get(slider.param);

            ui.label(&slider.label);
            ui.add(egui::Slider::new(&mut value, range.min..=range.max).step_by(range.step));
            if !range.marks.is_empty() {
                let marks: Vec<String> = range.marks.iter().map(|m| m.to_string()).collect();
                ui.weak(marks.join("  |  "));
            }
            ui.add_space(6.0);

            changed |= state.set_param(slider.param, range.snap(value));
        }

        if ui.button("Reset").clicked() {
            changed |= state.reset();
        }

        ui.separator();
        self.show_steady_state(ui, state);

        changed
    }

    fn show_steady_state(&self, ui: &mut egui::Ui, state: &DashboardState) {
        let steady = state.steady();
        let p = state.params();

        ui.label("Steady state");
        ui.label(format!(
            "open loop: {:.3}  ({} + {})",
            steady.open_loop,
            ParamKind::Setpoint.symbol(),
            ParamKind::Perturbation.symbol()
        ));
        match steady.closed_loop {
            Some(v) => {
                ui.label(format!("closed loop: {:.3}", v));
            }
            None => {
                ui.colored_label(
                    egui::Color32::YELLOW,
                    format!("closed loop: unbounded (1 + G*K = {})", 1.0 + p.loop_gain()),
                );
            }
        }
        if let Some(effect) = steady.feedback_effect() {
            ui.weak(format!("feedback shifts the output by {:+.3}", effect));
        }
    }
}
