//! Dish type icons
//!
//! Dish type labels come from the provider as free text. They resolve to a
//! closed set of icons; anything unrecognised gets the generic one.

/// Icon for a dish type label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DishIcon {
    MainCourse,
    SideDish,
    Dessert,
    Appetizer,
    Salad,
    Bread,
    Breakfast,
    Soup,
    Beverage,
    Sauce,
    Snack,
    Generic,
}

impl DishIcon {
    /// Resolve a dish type label, case and whitespace insensitive
    pub fn from_tag(tag: &str) -> DishIcon {
        match tag.trim().to_lowercase().as_str() {
            "main course" | "main dish" | "lunch" | "dinner" => DishIcon::MainCourse,
            "side dish" => DishIcon::SideDish,
            "dessert" => DishIcon::Dessert,
            "appetizer" | "starter" | "antipasti" | "antipasto" | "hor d'oeuvre" => {
                DishIcon::Appetizer
            }
            "salad" => DishIcon::Salad,
            "bread" => DishIcon::Bread,
            "breakfast" | "morning meal" | "brunch" => DishIcon::Breakfast,
            "soup" => DishIcon::Soup,
            "beverage" | "drink" => DishIcon::Beverage,
            "sauce" | "marinade" | "condiment" | "dip" | "spread" => DishIcon::Sauce,
            "snack" | "fingerfood" => DishIcon::Snack,
            _ => DishIcon::Generic,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            DishIcon::MainCourse => "🍽️",
            DishIcon::SideDish => "🥔",
            DishIcon::Dessert => "🍰",
            DishIcon::Appetizer => "🥟",
            DishIcon::Salad => "🥗",
            DishIcon::Bread => "🍞",
            DishIcon::Breakfast => "🍳",
            DishIcon::Soup => "🍲",
            DishIcon::Beverage => "🥤",
            DishIcon::Sauce => "🫙",
            DishIcon::Snack => "🥨",
            DishIcon::Generic => "🍴",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DishIcon::MainCourse => "Main course",
            DishIcon::SideDish => "Side dish",
            DishIcon::Dessert => "Dessert",
            DishIcon::Appetizer => "Appetizer",
            DishIcon::Salad => "Salad",
            DishIcon::Bread => "Bread",
            DishIcon::Breakfast => "Breakfast",
            DishIcon::Soup => "Soup",
            DishIcon::Beverage => "Beverage",
            DishIcon::Sauce => "Sauce",
            DishIcon::Snack => "Snack",
            DishIcon::Generic => "Dish",
        }
    }
}

/// Distinct icons for a recipe's dish types, in first-seen order
pub fn icons_for(dish_types: &[String]) -> Vec<DishIcon> {
    let mut icons = Vec::new();
    for tag in dish_types {
        let icon = DishIcon::from_tag(tag);
        if !icons.contains(&icon) {
            icons.push(icon);
        }
    }
    icons
}
