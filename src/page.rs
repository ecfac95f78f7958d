use axum::response::Html;

use crate::selection::{Selection, SelectionMode, ToggleGroup, CATEGORIES, VIBES};

pub async fn index() -> Html<String> {
    Html(render_index())
}

pub fn render_index() -> String {
    let categories = ToggleGroup::new(CATEGORIES.iter().copied(), SelectionMode::Single);
    let vibes = ToggleGroup::new(VIBES.iter().copied(), SelectionMode::Multiple);

    PAGE.replace("{{CATEGORY_TOGGLES}}", &render_group(&categories, "category"))
        .replace("{{VIBE_TOGGLES}}", &render_group(&vibes, "vibe"))
}

fn render_group(group: &ToggleGroup, kind: &str) -> String {
    group
        .render(&Selection::empty(group.mode()))
        .into_iter()
        .map(|toggle| {
            let label = escape_html(&toggle.label);
            let class = if toggle.active { "toggle active" } else { "toggle" };
            format!(
                r#"<button type="button" class="{class}" data-kind="{kind}" data-value="{label}">{label}</button>"#
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const PAGE: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Trendy Image Caption Generator</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
            padding: 20px;
        }

        .container {
            background: white;
            border-radius: 20px;
            box-shadow: 0 20px 60px rgba(0,0,0,0.3);
            max-width: 960px;
            margin: 0 auto;
            padding: 40px;
        }

        h1 { color: #333; margin-bottom: 24px; font-size: 2em; text-align: center; }
        h2 { color: #667eea; font-size: 0.9em; text-transform: uppercase; letter-spacing: 1px; margin: 24px 0 10px; }

        .toggles { display: flex; flex-wrap: wrap; gap: 8px; }

        .toggle {
            padding: 8px 14px;
            border-radius: 20px;
            border: none;
            background: #e5e7eb;
            color: #374151;
            font-size: 0.9em;
            font-weight: 500;
            cursor: pointer;
        }

        .toggle:hover { background: #d1d5db; }
        .toggle.active { background: linear-gradient(180deg, #8b5cf6, #7c3aed); color: white; }

        input[type="text"], textarea {
            width: 100%;
            padding: 12px;
            border: 2px solid #e0e0e0;
            border-radius: 10px;
            font-size: 1em;
        }

        textarea { min-height: 90px; resize: vertical; }

        .row { display: flex; gap: 10px; align-items: center; margin-top: 10px; flex-wrap: wrap; }

        .primary, .secondary {
            padding: 12px 20px;
            border-radius: 10px;
            border: none;
            font-weight: 600;
            cursor: pointer;
        }

        .primary { background: #667eea; color: white; width: 100%; margin-top: 24px; font-size: 1.05em; }
        .secondary { background: #f0f2ff; color: #667eea; border: 2px solid #667eea; }
        button:disabled { opacity: 0.5; cursor: not-allowed; }

        .result { background: #f8f9ff; border-radius: 10px; padding: 20px; margin-top: 20px; display: none; }
        .result-text { color: #333; font-size: 1.2em; line-height: 1.6; margin-bottom: 12px; }
        .hint { color: #999; font-size: 0.85em; }

        .error {
            background: #fee;
            border: 2px solid #fcc;
            color: #c33;
            padding: 15px;
            border-radius: 10px;
            margin-top: 20px;
            display: none;
            cursor: pointer;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>Trendy Image Caption Generator</h1>

        <h2>Image Type</h2>
        <div class="toggles" id="categories">
{{CATEGORY_TOGGLES}}
        </div>

        <h2>Vibes</h2>
        <div class="toggles" id="vibes">
{{VIBE_TOGGLES}}
        </div>

        <h2>Image (optional)</h2>
        <div class="row">
            <input type="file" id="fileInput" accept="image/*">
            <input type="text" id="urlInput" placeholder="...or paste an image URL">
        </div>
        <div class="row">
            <button type="button" class="secondary" id="analyzeBtn">Analyze image</button>
            <button type="button" class="secondary" id="uploadBtn">Upload &amp; get link</button>
            <span class="hint" id="uploadedUrl"></span>
        </div>

        <h2>Additional Information</h2>
        <textarea id="additionalInfo" placeholder="Anything the caption should know about the image"></textarea>

        <button type="button" class="primary" id="generateBtn" disabled>Generate Caption</button>

        <div class="error" id="error" title="Click to dismiss"></div>

        <div class="result" id="result">
            <div class="result-text" id="captionText"></div>
            <button type="button" class="secondary" id="copyBtn">Copy</button>
            <span class="hint" id="copied"></span>
        </div>
    </div>

    <script>
        const state = { category: "", vibes: [] };

        const generateBtn = document.getElementById('generateBtn');
        const analyzeBtn = document.getElementById('analyzeBtn');
        const uploadBtn = document.getElementById('uploadBtn');
        const fileInput = document.getElementById('fileInput');
        const urlInput = document.getElementById('urlInput');
        const additionalInfo = document.getElementById('additionalInfo');
        const errorDiv = document.getElementById('error');
        const resultDiv = document.getElementById('result');
        const captionText = document.getElementById('captionText');
        // Ids of buttons whose request is still in flight.
        const pending = new Set();

        // Same click rules as the server-side ToggleGroup.
        function toggle(kind, option) {
            if (kind === 'category') {
                state.category = state.category === option ? "" : option;
            } else {
                state.vibes = state.vibes.includes(option)
                    ? state.vibes.filter((item) => item !== option)
                    : [...state.vibes, option];
            }
            refresh();
        }

        function refresh() {
            document.querySelectorAll('.toggle').forEach((button) => {
                const value = button.dataset.value;
                const active = button.dataset.kind === 'category'
                    ? state.category === value
                    : state.vibes.includes(value);
                button.classList.toggle('active', active);
            });
            generateBtn.disabled = pending.has(generateBtn.id)
                || state.category.length === 0
                || state.vibes.length === 0;
        }

        function showError(message) {
            errorDiv.textContent = message;
            errorDiv.style.display = 'block';
        }

        errorDiv.addEventListener('click', () => { errorDiv.style.display = 'none'; });

        document.querySelectorAll('.toggle').forEach((button) => {
            button.addEventListener('click', () => toggle(button.dataset.kind, button.dataset.value));
        });

        async function call(button, path, init) {
            const original = button.textContent;
            pending.add(button.id);
            button.disabled = true;
            button.textContent = 'Working...';
            errorDiv.style.display = 'none';
            try {
                const response = await fetch(path, init);
                const data = await response.json().catch(() => ({}));
                if (!response.ok) {
                    throw new Error(data.error || ('HTTP ' + response.status));
                }
                return data;
            } finally {
                pending.delete(button.id);
                button.disabled = false;
                button.textContent = original;
                refresh();
            }
        }

        analyzeBtn.addEventListener('click', async () => {
            let init;
            if (fileInput.files[0]) {
                const formData = new FormData();
                formData.append('image', fileInput.files[0]);
                init = { method: 'POST', body: formData };
            } else {
                init = {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({ imageUrl: urlInput.value.trim() }),
                };
            }
            try {
                const data = await call(analyzeBtn, '/analyze-image', init);
                const existing = additionalInfo.value.trim();
                additionalInfo.value = existing ? existing + '\n' + data.description : data.description;
            } catch (error) {
                showError(error.message);
            }
        });

        uploadBtn.addEventListener('click', async () => {
            const formData = new FormData();
            if (fileInput.files[0]) {
                formData.append('image', fileInput.files[0]);
            }
            try {
                const data = await call(uploadBtn, '/upload-image', { method: 'POST', body: formData });
                urlInput.value = data.imageUrl;
                document.getElementById('uploadedUrl').textContent = data.imageUrl;
            } catch (error) {
                showError(error.message);
            }
        });

        generateBtn.addEventListener('click', async () => {
            try {
                const data = await call(generateBtn, '/generate-caption', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({
                        imageType: state.category,
                        vibes: state.vibes,
                        additionalInfo: additionalInfo.value,
                    }),
                });
                captionText.textContent = data.caption.replaceAll('*', '');
                resultDiv.style.display = 'block';
            } catch (error) {
                showError('Failed to generate caption. Please try again.');
            }
        });

        document.getElementById('copyBtn').addEventListener('click', async () => {
            await navigator.clipboard.writeText(captionText.textContent);
            document.getElementById('copied').textContent = 'Copied!';
        });

        refresh();
    </script>
</body>
</html>
"#;
