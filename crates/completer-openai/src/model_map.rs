use std::borrow::Cow;

use completer_core::model::Model;

/// Wire identifier for `model`, or `None` when the identifier is unusable.
pub(crate) fn map_model(model: &Model) -> Option<Cow<'_, str>> {
    match model {
        Model::OpenAi(openai_model) => Some(openai_model.id().into()),
        Model::Custom(custom) if custom.trim().is_empty() => None,
        Model::Custom(custom) => Some(Cow::Borrowed(custom.as_str())),
    }
}
