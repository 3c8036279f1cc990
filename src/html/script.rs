//! The embedded viewer script.
//!
//! The script is plain ES2017 with no dependencies. It reads its settings
//! from a JSON block (`#snapguide-config`) so the script text itself never
//! changes between documents. Behaviour:
//!
//! - step checkboxes update a progress bar and persist to `localStorage`
//!   under the document's storage key;
//! - quiz options reveal correct/incorrect feedback and the explanation;
//! - clicking a tag scrolls to the first step carrying it and highlights
//!   every step that shares the tag;
//! - the theme button toggles light and dark mode;
//! - reveal hotspots toggle their popover;
//! - with a password set, content stays hidden until the SHA-256 digest of
//!   the typed value matches;
//! - with LMS reporting on, completion is sent to a SCORM 1.2 API when one
//!   is found in a parent frame.

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::text::escape_script_json;
use crate::error::Result;

/// Settings read by the viewer script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptConfig {
    /// `localStorage` key for completed steps
    pub storage_key: String,
    /// Number of steps
    pub total_steps: usize,
    /// Hex SHA-256 of the access password
    pub password_hash: Option<String>,
    /// Report completion to a SCORM 1.2 LMS
    pub lms: bool,
    /// Start in dark mode
    pub dark_mode: bool,
}

impl ScriptConfig {
    /// The config as a `<script type="application/json">` block.
    pub fn to_html(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(format!(
            "<script id=\"snapguide-config\" type=\"application/json\">{}</script>",
            escape_script_json(&json)
        ))
    }
}

/// Lowercase hex SHA-256 digest, matching what `crypto.subtle` produces in
/// the viewer.
///
/// # Examples
///
/// ```
/// use snapguide::html::password_digest;
///
/// assert_eq!(
///     password_digest("abc"),
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
/// );
/// ```
pub fn password_digest(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Viewer script.
pub const VIEWER_SCRIPT: &str = r#"(function () {
  'use strict';
  var config = JSON.parse(document.getElementById('snapguide-config').textContent);
  var root = document.documentElement;

  function $(sel, ctx) { return (ctx || document).querySelector(sel); }
  function $all(sel, ctx) { return Array.prototype.slice.call((ctx || document).querySelectorAll(sel)); }

  // storage
  function load() {
    try { return JSON.parse(window.localStorage.getItem(config.storageKey) || '[]'); }
    catch (e) { return []; }
  }
  function save(done) {
    try { window.localStorage.setItem(config.storageKey, JSON.stringify(done)); }
    catch (e) { /* private mode */ }
  }

  // progress
  var reported = false;
  function updateProgress() {
    var boxes = $all('.step-complete');
    var done = boxes.filter(function (b) { return b.checked; });
    var pct = boxes.length ? Math.round(done.length * 100 / boxes.length) : 0;
    var bar = $('#progress-bar-fill');
    if (bar) { bar.style.width = pct + '%'; }
    var label = $('#progress-label');
    if (label) { label.textContent = done.length + ' of ' + boxes.length + ' steps complete'; }
    boxes.forEach(function (b) {
      var step = b.closest('.step');
      if (step) { step.classList.toggle('is-complete', b.checked); }
    });
    save(done.map(function (b) { return b.getAttribute('data-step'); }));
    if (config.lms && !reported && boxes.length && done.length === boxes.length) {
      reported = reportCompletion();
    }
  }
  function initProgress() {
    var done = load();
    $all('.step-complete').forEach(function (b) {
      b.checked = done.indexOf(b.getAttribute('data-step')) !== -1;
      b.addEventListener('change', updateProgress);
    });
    updateProgress();
  }

  // quiz
  function initQuiz() {
    $all('.quiz').forEach(function (quiz) {
      var answer = parseInt(quiz.getAttribute('data-answer'), 10);
      $all('.quiz-option', quiz).forEach(function (opt) {
        opt.addEventListener('click', function () {
          var picked = parseInt(opt.getAttribute('data-index'), 10);
          $all('.quiz-option', quiz).forEach(function (o) {
            o.disabled = true;
            var i = parseInt(o.getAttribute('data-index'), 10);
            o.classList.toggle('is-correct', i === answer);
            o.classList.toggle('is-wrong', i === picked && picked !== answer);
          });
          var feedback = $('.quiz-feedback', quiz);
          if (feedback) {
            feedback.hidden = false;
            feedback.classList.toggle('is-correct', picked === answer);
            $('.quiz-verdict', feedback).textContent = picked === answer ? 'Correct!' : 'Not quite.';
          }
        });
      });
    });
  }

  // tags
  function initTags() {
    $all('.tag').forEach(function (tag) {
      tag.addEventListener('click', function () {
        var name = tag.getAttribute('data-tag');
        var matches = $all('.step').filter(function (s) {
          return (s.getAttribute('data-tags') || '').split(' ').indexOf(name) !== -1;
        });
        $all('.step.is-highlighted').forEach(function (s) { s.classList.remove('is-highlighted'); });
        $all('.tag.is-active').forEach(function (t) { t.classList.remove('is-active'); });
        $all('.tag[data-tag="' + name + '"]').forEach(function (t) { t.classList.add('is-active'); });
        matches.forEach(function (s) { s.classList.add('is-highlighted'); });
        if (matches.length) { matches[0].scrollIntoView({ behavior: 'smooth', block: 'start' }); }
      });
    });
  }

  // theme
  function setTheme(dark) {
    root.setAttribute('data-theme', dark ? 'dark' : 'light');
    var btn = $('#theme-toggle');
    if (btn) { btn.setAttribute('aria-pressed', dark ? 'true' : 'false'); }
  }
  function initTheme() {
    setTheme(!!config.darkMode);
    var btn = $('#theme-toggle');
    if (btn) {
      btn.addEventListener('click', function () {
        setTheme(root.getAttribute('data-theme') !== 'dark');
      });
    }
  }

  // reveal hotspots
  function initReveals() {
    $all('.reveal-hotspot').forEach(function (spot) {
      spot.addEventListener('click', function (ev) {
        ev.stopPropagation();
        var pop = document.getElementById(spot.getAttribute('data-reveal'));
        if (!pop) { return; }
        var open = pop.hidden;
        $all('.reveal-popover').forEach(function (p) { p.hidden = true; });
        $all('.reveal-hotspot').forEach(function (s) { s.setAttribute('aria-expanded', 'false'); });
        pop.hidden = !open;
        spot.setAttribute('aria-expanded', open ? 'true' : 'false');
      });
    });
    document.addEventListener('click', function () {
      $all('.reveal-popover').forEach(function (p) { p.hidden = true; });
    });
  }

  // SCORM 1.2
  function findApi(win) {
    for (var depth = 0; win && depth < 10; depth++) {
      if (win.API) { return win.API; }
      if (win.parent === win) { break; }
      win = win.parent;
    }
    return window.opener && window.opener.API ? window.opener.API : null;
  }
  function reportCompletion() {
    var api = findApi(window);
    if (!api) { return false; }
    api.LMSInitialize('');
    api.LMSSetValue('cmi.core.lesson_status', 'completed');
    api.LMSSetValue('cmi.core.score.raw', '100');
    api.LMSCommit('');
    return true;
  }

  // password gate
  function hex(buffer) {
    return Array.prototype.map.call(new Uint8Array(buffer), function (b) {
      return ('0' + b.toString(16)).slice(-2);
    }).join('');
  }
  function unlock() {
    var gate = $('#password-gate');
    if (gate) { gate.hidden = true; }
    $('#content').hidden = false;
  }
  function initGate(next) {
    if (!config.passwordHash) { next(); return; }
    var form = $('#password-form');
    var input = $('#password-input');
    var error = $('#password-error');
    form.addEventListener('submit', function (ev) {
      ev.preventDefault();
      var data = new TextEncoder().encode(input.value);
      window.crypto.subtle.digest('SHA-256', data).then(function (digest) {
        if (hex(digest) === config.passwordHash) {
          unlock();
          next();
        } else {
          error.hidden = false;
          input.value = '';
          input.focus();
        }
      });
    });
  }

  initTheme();
  initGate(function () {
    initProgress();
    initQuiz();
    initTags();
    initReveals();
  });
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_lowercase_hex() {
        let d = password_digest("secret");
        assert_eq!(d.len(), 64);
        assert!(d.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_config_json_field_order() {
        let config = ScriptConfig {
            storage_key: "k".to_string(),
            total_steps: 3,
            password_hash: None,
            lms: true,
            dark_mode: false,
        };
        assert_eq!(
            config.to_html().unwrap(),
            "<script id=\"snapguide-config\" type=\"application/json\">\
             {\"storageKey\":\"k\",\"totalSteps\":3,\"passwordHash\":null,\"lms\":true,\"darkMode\":false}\
             </script>"
        );
    }

    #[test]
    fn test_script_covers_behaviours() {
        for needle in [
            "localStorage",
            "scrollIntoView",
            "data-theme",
            "reveal-hotspot",
            "crypto.subtle",
            "LMSSetValue",
            "quiz-option",
        ] {
            assert!(VIEWER_SCRIPT.contains(needle), "missing {}", needle);
        }
    }
}
