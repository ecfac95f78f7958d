//! Toggle-set pickers for the image category and vibes.
//!
//! Selection state is owned by the caller; a [`ToggleGroup`] only knows how a
//! click turns one selection into the next.

pub const CATEGORIES: &[&str] = &[
    "Adventure Sports",
    "Architecture",
    "Art",
    "Automotive",
    "Business",
    "City",
    "Culture",
    "Education",
    "Events",
    "Fashion",
    "Fitness",
    "Food",
    "Gaming",
    "Health",
    "History",
    "Home Decor",
    "Music",
    "Nature",
    "Personal",
    "Pets",
    "Space",
    "Sports",
    "Technology",
    "Travel",
    "Wildlife",
];

pub const VIBES: &[&str] = &[
    "Adventurous",
    "Bold",
    "Calm",
    "Cool",
    "Curious",
    "Dramatic",
    "Elegant",
    "Energetic",
    "Excited",
    "Funny",
    "Futuristic",
    "Gritty",
    "Happy",
    "Inspirational",
    "Intense",
    "Luxurious",
    "Majestic",
    "Minimalist",
    "Mysterious",
    "Nostalgic",
    "Peaceful",
    "Playful",
    "Quirky",
    "Relaxed",
    "Romantic",
    "Rustic",
    "Sad",
    "Sophisticated",
    "Surreal",
    "Tranquil",
    "Warm",
    "Whimsical",
    "Wow",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Single,
    Multiple,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Single(Option<String>),
    /// Kept in order of first selection.
    Multiple(Vec<String>),
}

impl Selection {
    pub fn empty(mode: SelectionMode) -> Self {
        match mode {
            SelectionMode::Single => Selection::Single(None),
            SelectionMode::Multiple => Selection::Multiple(Vec::new()),
        }
    }

    pub fn contains(&self, option: &str) -> bool {
        match self {
            Selection::Single(current) => current.as_deref() == Some(option),
            Selection::Multiple(current) => current.iter().any(|item| item == option),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Selection::Single(current) => current.is_none(),
            Selection::Multiple(current) => current.is_empty(),
        }
    }

    /// The selection that results from clicking `option`.
    pub fn toggled(&self, option: &str) -> Selection {
        match self {
            Selection::Single(current) if current.as_deref() == Some(option) => {
                Selection::Single(None)
            }
            Selection::Single(_) => Selection::Single(Some(option.to_string())),
            Selection::Multiple(current) => {
                let mut next: Vec<String> =
                    current.iter().filter(|item| *item != option).cloned().collect();
                if next.len() == current.len() {
                    next.push(option.to_string());
                }
                Selection::Multiple(next)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggle {
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct ToggleGroup {
    options: Vec<String>,
    mode: SelectionMode,
}

impl ToggleGroup {
    pub fn new<I, S>(options: I, mode: SelectionMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            mode,
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// One toggle per option, in option order.
    pub fn render(&self, selection: &Selection) -> Vec<Toggle> {
        self.options
            .iter()
            .map(|label| Toggle {
                label: label.clone(),
                active: selection.contains(label),
            })
            .collect()
    }

    /// Labels are not checked against `options`.
    pub fn click<F>(&self, selection: &Selection, option: &str, on_change: F)
    where
        F: FnOnce(Selection),
    {
        on_change(selection.toggled(option));
    }
}
