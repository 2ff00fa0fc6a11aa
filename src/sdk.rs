pub fn sdk_script() -> String {
    r#"// Certificate Desk browser SDK
(function(global) {
  const version = "0.1.0";
  let config = null;
  let session = null;

  async function post(url, body) {
    const res = await fetch(url, {
      method: "POST",
      credentials: "same-origin",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify(body || {}),
    });
    if (!res.ok) {
      throw new Error(`CertDesk: ${url} failed with ${res.status}: ${await res.text()}`);
    }
    return res.json();
  }

  async function init(opts = {}) {
    config = {
      sessionUrl: opts.sessionUrl || "/api/session",
      clickUrl: opts.clickUrl || "/api/relay/click",
      selectUrl: opts.selectUrl || "/api/relay/select",
      presetUrl: opts.presetUrl || "/api/relay/preset",
      messageUrl: opts.messageUrl || "/api/chat/message",
      sidebarSelector: opts.sidebarSelector || ".sidebar-item",
      onReply: opts.onReply || defaultReply,
    };
    session = await post(config.sessionUrl, { user_id: opts.userId });
    // Item indices must line up with the items the server registered.
    if (!opts.sidebarSelector && session.sidebar_selector) {
      config.sidebarSelector = session.sidebar_selector;
    }
    return config;
  }

  function defaultReply(reply) {
    const log = document.getElementById("chat-log");
    if (!log) return;
    for (const message of reply.replies || []) {
      if (!message.text) continue;
      const line = document.createElement("div");
      line.className = "bot";
      line.textContent = message.text;
      log.appendChild(line);
    }
    log.scrollTop = log.scrollHeight;
  }

  async function relay(url, body) {
    if (!config) await init();
    const reply = await post(url, body);
    config.onReply(reply);
    return reply;
  }

  // Items are identified by document position; the server reads their text.
  function registerSidebar(selector) {
    const items = document.querySelectorAll(selector || config.sidebarSelector);
    items.forEach((item, index) => {
      item.addEventListener("click", () => {
        relay(config.clickUrl, { item: index }).catch((err) => console.warn(err));
      });
    });
    return items.length;
  }

  function selectCertificate(name) {
    return relay(config.selectUrl, { name });
  }

  function sendPreset(message) {
    return relay(config.presetUrl, { message });
  }

  function sendMessage(message) {
    return relay(config.messageUrl, { message });
  }

  async function start(opts = {}) {
    await init(opts);
    registerSidebar();
    document.querySelectorAll("[data-preset]").forEach((button) => {
      button.addEventListener("click", () => {
        sendPreset(button.dataset.preset).catch((err) => console.warn(err));
      });
    });
    const form = document.getElementById("chat-form");
    const input = document.getElementById("chat-input");
    if (form && input) {
      form.addEventListener("submit", (event) => {
        event.preventDefault();
        const text = input.value.trim();
        if (!text) return;
        input.value = "";
        sendMessage(text).catch((err) => console.warn(err));
      });
    }
  }

  global.CertDesk = {
    version,
    init,
    start,
    registerSidebar,
    selectCertificate,
    sendPreset,
    sendMessage,
    session: () => session,
  };

  const script = document.currentScript;
  if (script && script.hasAttribute("data-autostart")) {
    const run = () => start().catch((err) => console.warn("CertDesk: start failed", err));
    if (document.readyState === "loading") {
      document.addEventListener("DOMContentLoaded", run);
    } else {
      run();
    }
  }
})(window);
"#
    .to_string()
}
