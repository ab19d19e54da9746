#![no_main]

use libfuzzer_sys::fuzz_target;
use tessera_core::geometry::{Rect, Size};
use tessera_widgets::{MenuAnchor, MenuKind, place_menu_popup};

const SHADOW: i32 = 10;

fuzz_target!(|data: &[u8]| {
    // Ten bytes: body, popup, item, parent offset, kind.
    if data.len() < 10 {
        return;
    }
    let px = |b: u8| i32::from(b) * 8;
    let body = Size::new(px(data[0]).max(64), px(data[1]).max(64));
    let popup = Size::new(px(data[2]).max(1), px(data[3]).max(1));
    let item = Rect::new(
        px(data[4]) % body.width,
        px(data[5]) % body.height,
        px(data[6]).max(1),
        20,
    );
    let parent = Rect::new(item.x, item.y.saturating_sub(i32::from(data[7])), item.width, 200);
    let kind = if data[8] & 1 == 0 { MenuKind::Root } else { MenuKind::Submenu };
    let scrollbar = i32::from(data[9] % 32);

    let placement = place_menu_popup(
        kind,
        MenuAnchor { item, parent },
        popup,
        body,
        scrollbar,
        SHADOW,
    );

    // Post-conditions that must always hold:
    if placement.scroll {
        let height = placement.height.expect("scrolling popup has a height");
        assert!(placement.top <= SHADOW, "scrolling popup did not move up");
        assert_eq!(placement.top + height, body.height - SHADOW, "scroll height misses the edge");
        assert_eq!(placement.width, Some(popup.width + scrollbar));
    } else {
        assert!(placement.height.is_none() && placement.width.is_none());
    }
    let original_top = match kind {
        MenuKind::Root => parent.bottom(),
        MenuKind::Submenu => item.y,
    };
    assert!(placement.top <= original_top, "popup moved down");
});
