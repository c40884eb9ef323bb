use super::escape_html;

/// Header and footer text of the widget page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branding {
    pub title: String,
    pub subtitle: String,
    pub footer: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            title: "🤖 AI Medical Assistant".to_string(),
            subtitle: "Powered by Gemini AI".to_string(),
            footer: "Medical Assistant Chatbot | Powered by AI".to_string(),
        }
    }
}

pub const INPUT_PLACEHOLDER: &str = "Type your medical condition here...";

const STYLE: &str = r#"
html, body {
    font-family: 'Poppins', sans-serif;
    background: #f0f2f6;
    margin: 0;
}
main {
    max-width: 860px;
    margin: 0 auto;
    padding: 0 16px;
}
.header-title {
    font-size: 48px;
    text-align: center;
    font-weight: bold;
    background: linear-gradient(90deg, #1976d2, #ef5350);
    -webkit-background-clip: text;
    -webkit-text-fill-color: transparent;
    margin-top: 30px;
}
.header-subtitle {
    font-size: 20px;
    text-align: center;
    color: #555;
    margin-bottom: 40px;
}
.footer {
    text-align: center;
    padding: 15px;
    margin-top: 30px;
    background-color: #ef5350;
    color: white;
    font-size: 16px;
    font-weight: 600;
    border-radius: 8px;
}
#transcript {
    display: flex;
    flex-direction: column;
}
.user-message, .ai-message {
    padding: 14px 20px;
    border-radius: 12px;
    margin: 10px 0;
    max-width: 90%;
    font-size: 16px;
    box-shadow: 0 3px 6px rgba(0,0,0,0.1);
}
.user-message {
    background: #c8e6c9;
    color: #1b5e20;
    align-self: flex-end;
    white-space: pre-wrap;
}
.ai-message {
    background: #ffffff;
    color: #333;
    border-left: 4px solid #1976d2;
    align-self: flex-start;
}
.ai-message.streaming, .ai-message.fallback {
    white-space: pre-wrap;
}
.highlighted-term {
    background-color: #ff9800;
    color: white;
    padding: 2px 8px;
    border-radius: 6px;
    font-weight: 600;
}
.notice {
    padding: 10px 16px;
    border-radius: 8px;
    margin: 10px 0;
}
.notice.warning { background: #fff3e0; color: #e65100; }
.notice.error { background: #ffebee; color: #b71c1c; }
#chat-form {
    display: flex;
    gap: 8px;
    margin-top: 20px;
}
#chat-input {
    flex: 1;
    padding: 12px 16px;
    font-size: 16px;
    border: 1px solid #cfd8dc;
    border-radius: 12px;
}
#chat-form button {
    padding: 12px 18px;
    border: none;
    border-radius: 12px;
    background: #1976d2;
    color: white;
    font-weight: 600;
    cursor: pointer;
}
#chat-form button.secondary { background: #90a4ae; }
::-webkit-scrollbar {
    width: 8px;
}
::-webkit-scrollbar-thumb {
    background-color: #90a4ae;
    border-radius: 10px;
}
"#;

const SCRIPT: &str = r#"
(function () {
    const transcript = document.getElementById("transcript");
    const form = document.getElementById("chat-form");
    const input = document.getElementById("chat-input");
    const reset = document.getElementById("chat-reset");

    let threadId = localStorage.getItem("medassist-thread");
    if (!threadId) {
        threadId = crypto.randomUUID();
        localStorage.setItem("medassist-thread", threadId);
    }
    const threadUrl = () => "/api/v1/threads/" + threadId;

    function append(html) {
        const holder = document.createElement("div");
        holder.innerHTML = html;
        const node = holder.firstElementChild;
        transcript.appendChild(node);
        node.scrollIntoView({ block: "end" });
        return node;
    }

    function notice(level, text) {
        const node = document.createElement("div");
        node.className = "notice " + level;
        node.textContent = text;
        transcript.appendChild(node);
    }

    async function load() {
        const response = await fetch(threadUrl());
        if (!response.ok) return;
        const thread = await response.json();
        transcript.innerHTML = "";
        thread.messages.forEach((m) => append(m.html));
    }

    function handle(name, data, live) {
        switch (name) {
            case "user_message":
                append(data.html);
                break;
            case "agent_text":
                if (!live.node) {
                    live.node = document.createElement("div");
                    live.node.className = "ai-message streaming";
                    transcript.appendChild(live.node);
                }
                live.node.textContent += data.chunk;
                break;
            case "notice":
                if (live.node) { live.node.remove(); live.node = null; }
                notice(data.level, data.text);
                break;
            case "agent_message":
                if (live.node) { live.node.remove(); live.node = null; }
                append(data.html);
                break;
        }
    }

    async function send(text) {
        const response = await fetch(threadUrl(), {
            method: "POST",
            headers: { "Content-Type": "application/json" },
            body: JSON.stringify({ text: text }),
        });
        if (!response.ok || !response.body) {
            const body = await response.json().catch(() => ({}));
            notice("error", body.error || ("Request failed: " + response.status));
            return;
        }

        const reader = response.body.getReader();
        const decoder = new TextDecoder();
        const live = { node: null };
        let buffer = "";
        for (;;) {
            const { value, done } = await reader.read();
            if (done) break;
            buffer += decoder.decode(value, { stream: true }).replace(/\r/g, "");
            let end;
            while ((end = buffer.indexOf("\n\n")) >= 0) {
                const frame = buffer.slice(0, end);
                buffer = buffer.slice(end + 2);
                let name = "message";
                const data = [];
                frame.split("\n").forEach((line) => {
                    if (line.startsWith("event:")) name = line.slice(6).trim();
                    else if (line.startsWith("data:")) data.push(line.slice(5).replace(/^ /, ""));
                });
                if (data.length) handle(name, JSON.parse(data.join("\n")), live);
            }
        }
    }

    form.addEventListener("submit", async (event) => {
        event.preventDefault();
        const text = input.value.trim();
        if (!text) return;
        input.value = "";
        input.disabled = true;
        try {
            await send(text);
        } catch (err) {
            notice("error", String(err));
        } finally {
            input.disabled = false;
            input.focus();
        }
    });

    reset.addEventListener("click", async () => {
        await fetch(threadUrl(), { method: "DELETE" });
        threadId = crypto.randomUUID();
        localStorage.setItem("medassist-thread", threadId);
        transcript.innerHTML = "";
    });

    load();
})();
"#;

/// The complete widget page
pub fn render_page(branding: &Branding) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="https://fonts.googleapis.com/css2?family=Poppins:wght@400;600;700&display=swap">
<style>{style}</style>
</head>
<body>
<main>
<div class="header-title">{title}</div>
<div class="header-subtitle">{subtitle}</div>
<div id="transcript"></div>
<form id="chat-form" autocomplete="off">
<input id="chat-input" name="text" placeholder="{placeholder}" autofocus>
<button type="submit">Send</button>
<button type="button" id="chat-reset" class="secondary">New chat</button>
</form>
<div class="footer">{footer}</div>
</main>
<script>{script}</script>
</body>
</html>
"#,
        title = escape_html(&branding.title),
        subtitle = escape_html(&branding.subtitle),
        footer = escape_html(&branding.footer),
        placeholder = INPUT_PLACEHOLDER,
        style = STYLE,
        script = SCRIPT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_contains_layout_parts() {
        let page = render_page(&Branding::default());
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(r#"<div class="header-title">🤖 AI Medical Assistant</div>"#));
        assert!(page.contains(r#"placeholder="Type your medical condition here...""#));
        assert!(page.contains(".highlighted-term {"));
        assert!(page.contains(r#"<div class="footer">"#));
        assert!(page.contains("/api/v1/threads/"));
    }

    #[test]
    fn test_branding_is_escaped() {
        let branding = Branding {
            title: "<Clinic>".to_string(),
            ..Branding::default()
        };
        let page = render_page(&branding);
        assert!(page.contains("&lt;Clinic&gt;"));
        assert!(!page.contains("<Clinic>"));
    }
}
