// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::RuntimeText;

/// Checks the structural guarantees every public mutation must uphold.
#[track_caller]
pub(crate) fn assert_text_invariants(text: &RuntimeText) {
    assert_eq!(
        text.char_styles().len(),
        text.len(),
        "one style per character of {:?}",
        text.text()
    );
    for (index, &id) in text.char_styles().iter().enumerate() {
        assert!(
            text.styles().get(id).is_some(),
            "character {index} refers to unknown style {id:?}"
        );
    }

    let paragraphs = text.style_runs();
    assert_eq!(
        paragraphs.len(),
        text.text().matches('\n').count() + 1,
        "one paragraph per line terminator plus one"
    );
    assert_eq!(paragraphs.len(), text.paragraph_styles().len());
    let mut expected_start = 0;
    for paragraph in paragraphs {
        assert_eq!(paragraph.start, expected_start, "paragraphs are contiguous");
        expected_start = paragraph.end();

        if !text.rendering_enabled() || paragraph.len == 0 {
            continue;
        }
        let mut run_start = paragraph.start;
        for run in &paragraph.runs {
            assert_eq!(run.start, run_start, "runs are contiguous");
            assert!(run.len > 0, "only an empty paragraph has an empty run");
            let first = text.style(run.style);
            for offset in run.start..run.end() {
                assert!(
                    first.equals_ignoring_spell(text.style_at(offset)),
                    "character {offset} does not match the style of its run"
                );
            }
            run_start = run.end();
        }
        assert_eq!(run_start, paragraph.end(), "runs cover the paragraph");
    }
    assert_eq!(expected_start, text.len(), "paragraphs cover the text");
}
