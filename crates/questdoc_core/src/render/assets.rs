//! Static style and script blocks embedded into every export.

/// Inline stylesheet. Highlights the `:target` section and flags
/// unresolved options.
pub const STYLE_BLOCK: &str = r#"  <style>
    :root {
      --bg: #eef4ff;
      --card: #ffffff;
      --text: #111827;
      --muted: #475569;
      --line: rgba(15, 23, 42, .12);
      --accent: #2f6feb;
      --accent-soft: rgba(47, 111, 235, .12);
      --danger: #b42318;
      --shadow: 0 10px 24px rgba(15, 23, 42, .08);
      --radius: 14px;
    }
    * { box-sizing: border-box; }
    html { scroll-behavior: smooth; }
    body {
      margin: 0;
      font-family: ui-sans-serif, system-ui, -apple-system, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
      background: var(--bg);
      color: var(--text);
      line-height: 1.55;
    }
    header, main, footer { max-width: 980px; margin: 0 auto; padding: 18px; }
    header { padding-top: 28px; }
    header h1 { margin: 0 0 6px 0; font-size: clamp(1.4rem, 2.3vw, 2rem); }
    header p { margin: 6px 0 0 0; color: var(--muted); }
    hr { border: 0; border-top: 1px solid var(--line); margin: 18px 0; }
    main { padding-bottom: 45vh; }
    section {
      background: var(--card);
      border: 1px solid var(--line);
      border-radius: var(--radius);
      box-shadow: var(--shadow);
      padding: 18px;
      margin: 14px 0;
      scroll-margin-top: 14px;
    }
    section h2 { margin: 0 0 10px 0; font-size: 1.25rem; }
    section h3 { margin: 14px 0 8px 0; font-size: 1.05rem; }
    section:target {
      border-color: var(--accent);
      box-shadow: 0 14px 35px rgba(47, 111, 235, .18), var(--shadow);
      position: relative;
    }
    section:target::before {
      content: "Aktiver Knoten";
      position: absolute;
      top: -10px;
      right: 14px;
      font-size: .78rem;
      color: var(--accent);
      background: #fff;
      border: 1px solid rgba(47, 111, 235, .35);
      padding: 4px 8px;
      border-radius: 999px;
    }
    nav { display: flex; flex-wrap: wrap; gap: 8px; margin-top: 10px; }
    nav a {
      display: inline-block;
      text-decoration: none;
      color: var(--accent);
      background: var(--accent-soft);
      border: 1px solid rgba(47, 111, 235, .25);
      padding: 6px 10px;
      border-radius: 999px;
      font-weight: 600;
      font-size: .92rem;
    }
    nav a:hover { text-decoration: underline; }
    ul, ol { margin: 8px 0 0 22px; }
    li { margin: 4px 0; }
    li.unresolved a { color: var(--danger); }
    em.target-unknown { color: var(--danger); }
    details {
      margin-top: 10px;
      padding: 10px 12px;
      border: 1px dashed rgba(15, 23, 42, .18);
      border-radius: 12px;
    }
    summary { cursor: pointer; font-weight: 700; }
    blockquote {
      margin: 10px 0;
      padding: 10px 12px;
      border-left: 4px solid rgba(47, 111, 235, .45);
      background: rgba(47, 111, 235, .06);
      border-radius: 10px;
    }
    pre {
      margin: 0;
      font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace;
      font-size: .92rem;
      white-space: pre-wrap;
    }
    footer small { color: var(--muted); }
    .flash { animation: flash-glow .7s ease-out; }
    @keyframes flash-glow {
      0% { box-shadow: 0 0 0 rgba(47, 111, 235, 0); }
      40% { box-shadow: 0 0 0 6px rgba(47, 111, 235, .18); }
      100% { box-shadow: 0 0 0 rgba(47, 111, 235, 0); }
    }
  </style>"#;

/// Inline script: flashes the section named by the URL hash.
pub const SCRIPT_BLOCK: &str = r#"  <script>
    (function () {
      function flashHashTarget() {
        var id = location.hash ? decodeURIComponent(location.hash.slice(1)) : "";
        if (!id) return;
        var el = document.getElementById(id);
        if (!el) return;
        el.scrollIntoView({ behavior: "smooth", block: "start" });
        el.classList.add("flash");
        setTimeout(function () { el.classList.remove("flash"); }, 700);
      }
      window.addEventListener("load", flashHashTarget);
      window.addEventListener("hashchange", flashHashTarget);
    })();
  </script>"#;
