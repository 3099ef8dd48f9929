use crate::{AppState, Effect, FlowError, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSelected(path) => {
            state.select_file(path);
            Vec::new()
        }
        Msg::UploadClicked => match state.begin_upload() {
            Ok((request_id, path)) => vec![Effect::Upload { request_id, path }],
            Err(err) => surface(err),
        },
        Msg::QuestionChanged(text) => {
            state.set_question_input(text);
            Vec::new()
        }
        Msg::QuestionSubmitted => match state.begin_chat() {
            Ok((request_id, request)) => vec![Effect::Chat {
                request_id,
                request,
            }],
            Err(err) => surface(err),
        },
        Msg::UploadFinished { request_id, result } => {
            state.finish_upload(request_id, result);
            Vec::new()
        }
        Msg::ChatFinished { request_id, result } => {
            state.finish_chat(request_id, result);
            Vec::new()
        }
    };

    (state, effects)
}

fn surface(err: FlowError) -> Vec<Effect> {
    if err.is_alert() {
        vec![Effect::Alert(err)]
    } else {
        Vec::new()
    }
}
