//! UI component catalog and label ordering

use std::cmp::Ordering;

/// UI component types, in the order they are drawn on every sketch sheet.
/// A complete user folder holds exactly one crop per entry.
pub const CATALOG: [&str; 26] = [
    "Checkbox Off",
    "Checkbox On",
    "Radio button Off",
    "Radio button On",
    "Floating action button",
    "Button",
    "Slider",
    "Drop down button",
    "Text Area",
    "Text Field",
    "Switch button Off",
    "Switch button On",
    "Chip",
    "Data Table",
    "Menu",
    "List",
    "Alert",
    "Bottom sheet",
    "Bottom navigation",
    "Time picker",
    "Date picker",
    "TabBar",
    "Snackbar",
    "Tooltip",
    "Grid list",
    "Card",
];

/// Compare file names with digit runs ordered by value
///
/// `scan2-1.jpg` sorts before `scan10-0.jpg` and `p-9.jpg` before `p-10.jpg`,
/// so unpadded scanner page numbers are read in page order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_num = take_number(&mut left);
                let r_num = take_number(&mut right);

                // Without leading zeros, the longer run is the larger number
                let ordering = l_num
                    .trim_start_matches('0')
                    .len()
                    .cmp(&r_num.trim_start_matches('0').len())
                    .then_with(|| {
                        l_num
                            .trim_start_matches('0')
                            .cmp(r_num.trim_start_matches('0'))
                    });
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                if l != r {
                    return l.cmp(&r);
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_number<I>(chars: &mut std::iter::Peekable<I>) -> String
where
    I: Iterator<Item = char>,
{
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        chars.next();
    }
    digits
}
