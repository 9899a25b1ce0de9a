mod common;

use common::{LETTER_CONTENT_BOTTOM, approx, body_texts, letter_composer};
use logistock_pdf::{
    Alignment, Canvas, Composer, DocumentOptions, Error, Margins, Orientation, PageFormat,
    SectionOptions, TableOptions, TextOptions,
};
use proptest::prelude::*;

#[test]
fn create_document_sets_up_letter_defaults() {
    let composer = letter_composer();
    let state = composer.state();
    assert!(composer.is_initialized());
    assert_eq!(state.current_page, 1);
    assert_eq!(state.current_y, 20.0);
    assert!(approx(state.page_width, 215.9));
    assert!(approx(state.page_height, 279.4));
    assert_eq!(state.margins, Margins::uniform(20.0));
    assert_eq!(state.default_font_size, 12.0);
    assert_eq!(state.line_height, 1.0);
    assert!(composer.sections().is_empty());
    assert!(composer.footer().is_none());
    assert_eq!(common::canvas(&composer).title(), Some("Inventory report"));
}

#[test]
fn landscape_a4_swaps_dimensions() {
    let mut composer: Composer = Composer::new();
    composer.create_document(DocumentOptions {
        orientation: Some(Orientation::Landscape),
        format: Some(PageFormat::A4),
        margins: Some(Margins::uniform(10.0)),
        ..DocumentOptions::default()
    });
    let state = composer.state();
    assert!((state.page_width - 297.0).abs() < 0.01);
    assert!((state.page_height - 210.0).abs() < 0.01);
    assert_eq!(state.current_y, 10.0);
}

#[test]
fn create_document_replaces_previous_document() {
    let mut composer = letter_composer();
    composer.add_text("first", TextOptions::new()).unwrap();
    composer.add_new_page().unwrap();
    composer.add_section(Some("Old"), 0.0).unwrap();
    composer.create_document(DocumentOptions::default());

    assert_eq!(composer.current_page(), 1);
    assert_eq!(composer.current_y(), 20.0);
    assert!(composer.sections().is_empty());
    assert_eq!(common::canvas(&composer).page_count(), 1);
}

#[test]
fn operations_before_create_document_fail() {
    let mut composer: Composer = Composer::new();
    assert!(!composer.is_initialized());
    assert!(!composer.check_page_space(1.0));

    let errors = [
        composer.add_new_page().unwrap_err(),
        composer.add_page_break().unwrap_err(),
        composer.add_text("x", TextOptions::new()).unwrap_err(),
        composer.add_header("x", 1, None).unwrap_err(),
        composer.add_spacing(5.0).unwrap_err(),
        composer.add_section(Some("x"), 1.0).unwrap_err(),
        composer.add_section_with(&SectionOptions::default()).unwrap_err(),
        composer.add_footer("x", None).unwrap_err(),
        composer
            .generate_table(&["A"], &[], &TableOptions::default())
            .unwrap_err(),
        composer.export_as_buffer().unwrap_err(),
    ];
    for err in errors {
        assert!(err.is_precondition(), "{err}");
    }
}

#[test]
fn empty_content_still_requires_a_document() {
    let mut composer: Composer = Composer::new();
    assert!(matches!(
        composer.add_text("   ", TextOptions::new()),
        Err(Error::Uninitialized { .. })
    ));
    assert!(matches!(
        composer.add_footer("", None),
        Err(Error::Uninitialized { .. })
    ));
    let no_headers: [&str; 0] = [];
    assert!(matches!(
        composer.generate_table(&no_headers, &[], &TableOptions::default()),
        Err(Error::Uninitialized { .. })
    ));
}

#[test]
fn reset_is_idempotent_and_uninitializes() {
    let mut composer = letter_composer();
    composer.add_text("stock", TextOptions::new()).unwrap();
    composer.reset();
    composer.reset();

    assert!(!composer.is_initialized());
    assert!(composer.canvas().is_none());
    let state = composer.state();
    assert_eq!(state.current_page, 1);
    assert_eq!(state.current_y, 0.0);
    assert_eq!(state.page_height, 0.0);
    assert_eq!(state.page_width, 0.0);
    assert!(composer.sections().is_empty());
    assert!(composer.add_text("x", TextOptions::new()).is_err());
}

#[test]
fn set_margins_before_create_document_applies_to_it() {
    let mut composer: Composer = Composer::new();
    composer.set_margins(Margins::uniform(30.0));
    composer.create_document(DocumentOptions::default());
    assert_eq!(composer.current_y(), 30.0);
    assert!(approx(composer.state().available_width(), 215.9 - 60.0));
}

#[test]
fn set_margins_moves_cursor_below_new_top() {
    let mut composer = letter_composer();
    composer.set_margins(Margins {
        top: 40.0,
        ..Margins::uniform(20.0)
    });
    assert_eq!(composer.current_y(), 40.0);
}

#[test]
fn whitespace_text_is_a_no_op() {
    let mut composer = letter_composer();
    composer.add_text("  \n\t ", TextOptions::new()).unwrap();
    composer.add_header("", 1, None).unwrap();
    assert_eq!(composer.current_y(), 20.0);
    assert!(body_texts(&composer, 1).is_empty());
}

#[test]
fn text_advances_by_font_size_times_line_height() {
    let mut composer = letter_composer();
    composer.add_text("Bolts", TextOptions::new()).unwrap();
    assert_eq!(composer.current_y(), 32.0);
    composer
        .add_text("Nuts", TextOptions::new().size(16.0).italic())
        .unwrap();
    assert_eq!(composer.current_y(), 48.0);
    assert_eq!(body_texts(&composer, 1), vec!["Bolts", "Nuts"]);
}

#[test]
fn text_that_does_not_fit_moves_to_next_page() {
    let mut composer = letter_composer();
    // 19 lines of 12mm fit between y=20 and y=259.4.
    for i in 0..19 {
        composer.add_text(&format!("line {i}"), TextOptions::new()).unwrap();
    }
    assert_eq!(composer.current_page(), 1);
    assert_eq!(composer.current_y(), 248.0);

    composer.add_text("line 19", TextOptions::new()).unwrap();
    assert_eq!(composer.current_page(), 2);
    assert_eq!(composer.current_y(), 32.0);
    assert_eq!(body_texts(&composer, 2), vec!["line 19"]);

    let (_, _, y) = common::page(&composer, 2).texts().next().unwrap();
    assert_eq!(y, 20.0);
}

#[test]
fn right_aligned_text_ends_at_right_margin() {
    let mut composer = letter_composer();
    composer
        .add_text("Total", TextOptions::new().align(Alignment::Right))
        .unwrap();
    let canvas = common::canvas(&composer);
    let (_, x, _) = common::page(&composer, 1).texts().next().unwrap();
    let width = logistock_pdf::Canvas::text_width(canvas, "Total");
    assert!(approx(x + width, 215.9 - 20.0));
}

#[test]
fn spacing_breaks_page_instead_of_overflowing() {
    let mut composer = letter_composer();
    composer.add_spacing(200.0).unwrap();
    assert_eq!(composer.current_y(), 220.0);

    composer.add_spacing(50.0).unwrap();
    assert_eq!(composer.current_page(), 2);
    assert_eq!(composer.current_y(), 20.0);

    composer.add_spacing(0.0).unwrap();
    composer.add_spacing(-4.0).unwrap();
    assert_eq!(composer.current_y(), 20.0);
}

#[test]
fn page_break_resets_cursor() {
    let mut composer = letter_composer();
    composer.add_text("a", TextOptions::new()).unwrap();
    composer.add_page_break().unwrap();
    composer.add_new_page().unwrap();
    assert_eq!(composer.current_page(), 3);
    assert_eq!(composer.current_y(), 20.0);
    assert_eq!(common::canvas(&composer).page_count(), 3);
}

#[test]
fn header_spacing_is_asymmetric() {
    let mut composer = letter_composer();
    composer.add_text("intro", TextOptions::new()).unwrap();
    composer.add_header("Stock levels", 1, None).unwrap();
    // 1mm before (20 * 0.05), 20mm line, 0.4mm after (20 * 0.02)
    assert!(approx(composer.current_y(), 32.0 + 1.0 + 20.0 + 0.4));
}

#[test]
fn header_at_top_of_page_skips_pre_spacing() {
    let mut composer = letter_composer();
    composer.add_header("Stock", 3, None).unwrap();
    let (_, _, y) = common::page(&composer, 1).texts().next().unwrap();
    assert_eq!(y, 20.0);
    assert!(approx(composer.current_y(), 20.0 + 16.0 + 0.32));
}

#[test]
fn header_post_spacing_may_pass_bottom_margin() {
    let mut composer = letter_composer();
    composer.add_spacing(218.2).unwrap();
    composer.add_header("Closing balance", 1, None).unwrap();

    assert_eq!(composer.current_page(), 1);
    assert!(composer.current_y() > LETTER_CONTENT_BOTTOM);
    assert!(composer.state().remaining_space() < 0.0);

    composer.add_text("next", TextOptions::new()).unwrap();
    assert_eq!(composer.current_page(), 2);
}

#[test]
fn header_levels_are_clamped() {
    let mut composer = letter_composer();
    composer.add_header("big", 0, None).unwrap();
    assert!(approx(composer.current_y(), 20.0 + 20.0 + 0.4));

    let mut composer = letter_composer();
    composer.add_header("small", 9, None).unwrap();
    assert!(approx(composer.current_y(), 20.0 + 12.0 + 0.24));
}

#[test]
fn sections_record_where_they_start() {
    let mut composer = letter_composer();
    composer.add_section(Some("Receiving"), 5.0).unwrap();
    composer.add_text("dock 4", TextOptions::new()).unwrap();
    composer.add_section(None, 0.0).unwrap();

    let sections = composer.sections();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].title.as_deref(), Some("Receiving"));
    assert_eq!(sections[0].start_page, 1);
    assert_eq!(sections[0].start_y, 25.0);
    assert!(sections[0].id.starts_with("section-"));
    assert_ne!(sections[0].id, sections[1].id);
    assert_eq!(sections[1].title, None);
    assert_eq!(composer.composition().current_section, 2);
    assert_eq!(composer.composition().total_sections, 2);
    assert_eq!(body_texts(&composer, 1), vec!["Receiving", "dock 4"]);
}

#[test]
fn section_with_page_break_and_styled_title() {
    let mut composer = letter_composer();
    composer.add_text("cover", TextOptions::new()).unwrap();
    composer
        .add_section_with(&SectionOptions {
            title: Some("Returns".into()),
            title_options: Some(TextOptions::new().size(14.0)),
            spacing_before: 2.0,
            spacing_after: 3.0,
            page_break_before: true,
        })
        .unwrap();

    let section = &composer.sections()[0];
    assert_eq!(section.start_page, 2);
    assert_eq!(section.start_y, 22.0);
    assert_eq!(composer.current_y(), 22.0 + 14.0 + 3.0);
    assert_eq!(body_texts(&composer, 2), vec!["Returns"]);
}

proptest! {
    #[test]
    fn page_space_query_matches_remaining_room(used in 0.0f32..239.0, required in 0.0f32..300.0) {
        let mut composer = letter_composer();
        composer.add_spacing(used).unwrap();
        let remaining = composer.state().remaining_space();
        prop_assert_eq!(composer.check_page_space(required), required <= remaining);
        prop_assert_eq!(composer.current_page(), 1);
    }
}
