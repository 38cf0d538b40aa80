use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize as _},
    text::{Line, Text},
    widgets::{Block, Paragraph},
    Frame,
};
use wrapper_core::{controller::RequestController, state::Trigger};

use super::{
    event::{Action, InputMode},
    input::{InputView as _, TextInputEvent, TextInputViewModel},
    models::{ModelPickerEvent, ModelPickerView as _, ModelPickerViewModel},
    output::{OutputEvent, OutputView as _, OutputViewModel},
    widgets_ext::StyleExt as _,
    AppEvent,
};

const TITLE: &str = "LLM Privacy Wrapper";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    #[default]
    Input,
    Models,
    Output,
}

impl Pane {
    fn next(self) -> Pane {
        match self {
            Pane::Input => Pane::Models,
            Pane::Models => Pane::Output,
            Pane::Output => Pane::Input,
        }
    }

    fn previous(self) -> Pane {
        match self {
            Pane::Input => Pane::Output,
            Pane::Models => Pane::Input,
            Pane::Output => Pane::Models,
        }
    }
}

/// The whole screen: text entry, model picker, submit control and output.
#[derive(Debug, Default, Clone)]
pub struct FormViewModel {
    pub input: TextInputViewModel,
    pub models: ModelPickerViewModel,
    pub output: OutputViewModel,
    active_pane: Option<Pane>,
    focused_pane: Pane,
}

impl FormViewModel {
    pub fn handle_action(
        &mut self,
        action: Action,
        controller: &RequestController,
    ) -> Option<AppEvent> {
        let Some(pane) = self.active_pane else {
            return self.handle_navigation(action);
        };

        match pane {
            Pane::Input => match self.input.handle_action(action)? {
                TextInputEvent::Changed => Some(AppEvent::TextChanged),
                TextInputEvent::Submit => Some(AppEvent::Submit),
                TextInputEvent::Deactivate => {
                    self.active_pane = None;
                    Some(AppEvent::InputMode(InputMode::Normal))
                }
            },
            Pane::Models => {
                let catalog = controller.catalog();
                let selected = catalog.position(controller.form().model()).unwrap_or(0);
                match self
                    .models
                    .handle_action(action, selected, catalog.options().len())
                {
                    Some(ModelPickerEvent::Select(index)) => Some(AppEvent::SelectModel(index)),
                    Some(ModelPickerEvent::Deactivate) => {
                        self.active_pane = None;
                        None
                    }
                    None if action == Action::Submit => Some(AppEvent::Submit),
                    None => None,
                }
            }
            Pane::Output => match self.output.handle_action(action) {
                Some(OutputEvent::Deactivate) => {
                    self.active_pane = None;
                    None
                }
                None if action == Action::Submit => Some(AppEvent::Submit),
                None => None,
            },
        }
    }

    fn handle_navigation(&mut self, action: Action) -> Option<AppEvent> {
        match action {
            Action::Up | Action::Left => {
                self.focused_pane = self.focused_pane.previous();
                None
            }
            Action::Down | Action::Right => {
                self.focused_pane = self.focused_pane.next();
                None
            }
            Action::Enter => self.activate(self.focused_pane),
            Action::Edit => {
                self.focused_pane = Pane::Input;
                self.activate(Pane::Input)
            }
            Action::Submit => Some(AppEvent::Submit),
            Action::Quit => Some(AppEvent::Quit),
            _ => None,
        }
    }

    fn activate(&mut self, pane: Pane) -> Option<AppEvent> {
        self.active_pane = Some(pane);
        match pane {
            Pane::Input => Some(AppEvent::InputMode(InputMode::Edit)),
            Pane::Models | Pane::Output => None,
        }
    }

    fn pane_style(&self, pane: Pane) -> Style {
        if self.active_pane == Some(pane) {
            Style::active()
        } else if self.active_pane.is_none() && self.focused_pane == pane {
            Style::focused()
        } else {
            Style::default()
        }
    }

    fn help(&self) -> Line<'static> {
        match self.active_pane {
            Some(Pane::Input) => Line::from(vec![
                "Esc".bold(),
                " stop editing, ".into(),
                "Enter".bold(),
                " new line, ".into(),
                "Ctrl+s".bold(),
                " submit".into(),
            ]),
            Some(Pane::Models) => Line::from(vec![
                "j/k".bold(),
                " pick a model, ".into(),
                "Enter".bold(),
                " done".into(),
            ]),
            Some(Pane::Output) => Line::from(vec![
                "j/k".bold(),
                " scroll, ".into(),
                "Esc".bold(),
                " done".into(),
            ]),
            None => Line::from(vec![
                "Tab".bold(),
                " move, ".into(),
                "Enter".bold(),
                " select, ".into(),
                "e".bold(),
                " edit, ".into(),
                "s".bold(),
                " submit, ".into(),
                "q".bold(),
                " quit".into(),
            ]),
        }
    }
}

fn trigger_style(trigger: Trigger) -> Style {
    match trigger {
        Trigger::Enabled => Style::default().fg(Color::White).bg(Color::Blue).bold(),
        Trigger::Disabled => Style::default().fg(Color::DarkGray),
        Trigger::InProgress => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::SLOW_BLINK),
    }
}

#[extend::ext(name = FormView)]
pub impl<'a> Frame<'a> {
    fn form_view(
        &mut self,
        parent: Rect,
        view_model: &mut FormViewModel,
        controller: &RequestController,
    ) {
        let catalog = controller.catalog();
        let model_rows = u16::try_from(catalog.options().len())
            .unwrap_or(u16::MAX)
            .saturating_add(2);

        let vertical = Layout::vertical([
            Constraint::Length(1),
            Constraint::Percentage(30),
            Constraint::Length(model_rows),
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(1),
        ]);
        let [title_area, input_area, models_area, trigger_area, output_area, help_area] =
            vertical.areas(parent);

        let title = Paragraph::new(TITLE.bold()).alignment(Alignment::Center);
        self.render_widget(title, title_area);

        self.input_view(
            input_area,
            view_model.pane_style(Pane::Input),
            &view_model.input,
            view_model.active_pane == Some(Pane::Input),
        );

        self.model_picker(
            models_area,
            view_model.pane_style(Pane::Models),
            &mut view_model.models,
            catalog,
            controller.form().model(),
        );

        let trigger = controller.trigger();
        let button = Paragraph::new(Text::from(trigger.label()))
            .alignment(Alignment::Center)
            .style(trigger_style(trigger))
            .block(Block::bordered());
        self.render_widget(button, trigger_area);

        let output_style = view_model.pane_style(Pane::Output);
        self.output_view(
            output_area,
            output_style,
            &mut view_model.output,
            controller.state().region(),
        );

        self.render_widget(Paragraph::new(view_model.help()), help_area);
    }
}
