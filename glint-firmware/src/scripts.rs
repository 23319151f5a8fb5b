//! Built-in script drawings
//!
//! Selected by index from the console (`RunScript`).

/// A named drawing script
pub struct Drawing {
    pub name: &'static str,
    pub text: &'static str,
}

pub static DRAWINGS: [Drawing; 2] = [
    Drawing {
        name: "star",
        text: include_str!("../scripts/star.txt"),
    },
    Drawing {
        name: "house",
        text: include_str!("../scripts/house.txt"),
    },
];

/// Look up a drawing by console index
pub fn drawing(index: u8) -> Option<&'static Drawing> {
    DRAWINGS.get(usize::from(index))
}
