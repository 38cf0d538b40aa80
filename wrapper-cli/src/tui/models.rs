use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, List, ListItem, ListState},
    Frame,
};
use wrapper_core::model::{ModelCatalog, ModelId};

use super::{event::Action, widgets_ext::StyleExt as _};

/// Picker over the configured models.
/// The selection itself lives in the form; this only keeps the list offset.
#[derive(Clone, Debug, Default)]
pub struct ModelPickerViewModel {
    list_state: ListState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelPickerEvent {
    Select(usize),
    Deactivate,
}

impl ModelPickerViewModel {
    pub fn handle_action(
        &mut self,
        action: Action,
        selected: usize,
        option_count: usize,
    ) -> Option<ModelPickerEvent> {
        let last = option_count.saturating_sub(1);
        let next = match action {
            Action::Up | Action::Left => selected.saturating_sub(1),
            Action::Down | Action::Right => selected.saturating_add(1).min(last),
            Action::Beginning => 0,
            Action::End => last,
            Action::Enter | Action::Escape | Action::Quit => {
                return Some(ModelPickerEvent::Deactivate)
            }
            _ => return None,
        };

        (next != selected).then_some(ModelPickerEvent::Select(next))
    }
}

#[extend::ext(name = ModelPickerView)]
pub impl<'a> Frame<'a> {
    fn model_picker(
        &mut self,
        parent: Rect,
        style: Style,
        view_model: &mut ModelPickerViewModel,
        catalog: &ModelCatalog,
        model: &ModelId,
    ) {
        let items = catalog
            .options()
            .iter()
            .map(|option| ListItem::new(option.label()));

        let list = List::new(items)
            .style(style)
            .highlight_style(style.inverted())
            .highlight_symbol("> ")
            .block(Block::bordered().title(format!("Model ({model})")));

        view_model.list_state.select(catalog.position(model));
        self.render_stateful_widget(list, parent, &mut view_model.list_state);
    }
}
