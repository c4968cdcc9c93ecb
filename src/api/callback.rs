use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};

use crate::{jukebox::Jukebox, warning};

/// OAuth callback target. The provider redirects here with either an
/// authorization code or an error; both paths consume the pending attempt
/// identified by the `state` parameter.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(jukebox): Extension<Arc<Jukebox>>,
) -> Html<&'static str> {
    let code = params.get("code").map(String::as_str);
    let state = params.get("state").map(String::as_str);
    let error = params.get("error").map(String::as_str);

    match jukebox.handle_callback(code, state, error).await {
        Ok(()) => Html(
            "<h2>Jukebox connected.</h2><p>You can close this window and head back to the party.</p>",
        ),
        Err(e) => {
            warning!("Authorization callback failed: {}", e);
            Html("<h4>Login failed.</h4><p>Start the authorization again from the jukebox.</p>")
        }
    }
}
