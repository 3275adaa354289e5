//! `/chat` and `/login` pages.

use axum::http::HeaderMap;
use axum::http::header::HOST;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::identity::{AUTH_COOKIE, Identity};

const CHAT_SCRIPT: &str = r#"
(function () {
  var messages = document.getElementById("messages");
  var input = document.getElementById("message");
  if (!window["WebSocket"]) {
    alert("Error: Your browser does not support web sockets.");
    return;
  }
  var socket = new WebSocket("ws://" + document.body.dataset.host + "/room");
  socket.onclose = function () {
    alert("Connection has been closed.");
  };
  socket.onmessage = function (e) {
    var item = document.createElement("li");
    item.textContent = e.data;
    messages.appendChild(item);
  };
  document.getElementById("chatbox").addEventListener("submit", function (e) {
    e.preventDefault();
    if (!input.value) return;
    socket.send(input.value);
    input.value = "";
  });
})();
"#;

fn layout(title: &str, host: &str, content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (title) }
                link rel="stylesheet" href="/assets/style.css";
            }
            body data-host=(host) {
                div.container { (content) }
            }
        }
    }
}

/// The chat room page. The script connects to `ws://{host}/room`.
pub fn chat_markup(host: &str, user_name: &str) -> Markup {
    let content = html! {
        h1 { "Let's chat" }
        p.who { "Signed in as " strong { (user_name) } }
        ul #messages {}
        form #chatbox {
            textarea #message {}
            input type="submit" value="Send";
        }
        script { (PreEscaped(CHAT_SCRIPT)) }
    };
    layout("Chat", host, &content)
}

/// The sign-in landing page.
pub fn login_markup(host: &str) -> Markup {
    let content = html! {
        h1 { "Sign in to chat" }
        p {
            "Your sign-in sets an " code { "auth" } " cookie for " (host)
            "; then head to " a href="/chat" { "the chat room" } "."
        }
    };
    layout("Login", host, &content)
}

fn request_host(headers: &HeaderMap) -> &str {
    headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// GET /chat: requires the `auth` cookie, otherwise 307 to `/login`.
pub async fn chat_page(headers: HeaderMap, jar: CookieJar) -> Response {
    let Some(cookie) = jar.get(AUTH_COOKIE) else {
        return Redirect::temporary("/login").into_response();
    };
    let user = Identity::from_cookie_value(cookie.value()).unwrap_or_default();

    Html(chat_markup(request_host(&headers), &user.name).into_string()).into_response()
}

/// GET /login
pub async fn login_page(headers: HeaderMap) -> Html<String> {
    Html(login_markup(request_host(&headers)).into_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use crate::server::{build_router, test_state};

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn chat_markup_escapes_user_and_host() {
        let page = chat_markup("x\"y", "<b>Ada</b>").into_string();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<strong>&lt;b&gt;Ada&lt;/b&gt;</strong>"));
        assert!(page.contains(r#"data-host="x&quot;y""#));
        assert!(!page.contains("<b>Ada</b>"));
    }

    #[test]
    fn chat_markup_keeps_script_verbatim() {
        let page = chat_markup("h", "Ada").into_string();
        assert!(page.contains(r#"document.getElementById("messages")"#));
    }

    #[test]
    fn login_markup_mentions_host() {
        let page = login_markup("chat.example").into_string();
        assert!(page.contains("cookie for chat.example"));
        assert!(page.contains(r#"href="/chat""#));
    }

    #[tokio::test]
    async fn chat_without_cookie_redirects_to_login() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()));

        let req = Request::builder().uri("/chat").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(resp.headers()[header::LOCATION], "/login");
    }

    #[tokio::test]
    async fn chat_with_cookie_renders_user_and_host() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()));
        let cookie = Identity {
            name: "Ada".into(),
        }
        .to_cookie_value();

        let req = Request::builder()
            .uri("/chat")
            .header(header::HOST, "chat.example:8080")
            .header(header::COOKIE, format!("{AUTH_COOKIE}={cookie}"))
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_text(resp).await;
        assert!(body.contains("<strong>Ada</strong>"));
        assert!(body.contains(r#"data-host="chat.example:8080""#));
    }

    #[tokio::test]
    async fn chat_with_undecodable_cookie_still_renders() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()));

        let req = Request::builder()
            .uri("/chat")
            .header(header::HOST, "h")
            .header(header::COOKIE, format!("{AUTH_COOKIE}=garbage"))
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("<strong></strong>"));
    }

    #[tokio::test]
    async fn login_renders_without_cookie() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()));

        let req = Request::builder()
            .uri("/login")
            .header(header::HOST, "h")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("cookie for h;"));
    }
}
