use crate::api::{Menu, Restaurant, Section, TimeOfDay};
use chrono::{NaiveTime, Timelike};

/// Serving period a menu can be filtered on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    All,
    Breakfast,
    Lunch,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::All => "all",
            Period::Breakfast => "breakfast",
            Period::Lunch => "lunch",
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keep the items served during `period`.
///
/// `all` returns the menu untouched. Otherwise an item stays if its period
/// matches (ignoring case) or is `both`, and sections left empty disappear.
pub fn filter_menu_by_period(menu: &Menu, period: &str) -> Menu {
    if period == Period::All.as_str() {
        return menu.clone();
    }

    let mut filtered = Menu::new();
    for section in menu.sections() {
        filtered.push_section(Section {
            name: section.name.clone(),
            items: section
                .items
                .iter()
                .filter(|item| {
                    item.period.eq_ignore_ascii_case(period)
                        || item.period.eq_ignore_ascii_case("both")
                })
                .cloned()
                .collect(),
        });
    }
    filtered
}

/// Which period a restaurant is serving at `now`.
///
/// Window bounds are inclusive. Lunch wins when the windows overlap, and
/// outside of both windows everything is shown.
pub fn current_period(restaurant: &Restaurant, now: NaiveTime) -> Period {
    let now = now.hour() * 60 + now.minute();
    let within =
        |start: &TimeOfDay, end: &TimeOfDay| now >= start.minutes() && now <= end.minutes();

    if within(&restaurant.lunch_start, &restaurant.lunch_end) {
        Period::Lunch
    } else if within(&restaurant.breakfast_start, &restaurant.breakfast_end) {
        Period::Breakfast
    } else {
        Period::All
    }
}

/// Format a time on a 12 hour clock, `--:--` when it was never set
pub fn format_time(time: &TimeOfDay) -> String {
    if time.is_unset() {
        return "--:--".to_string();
    }
    let meridiem = if time.hour >= 12 { "PM" } else { "AM" };
    let hour = match time.hour {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    format!("{}:{:02} {}", hour, time.minute, meridiem)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::fixtures::{menu_item, restaurant};

    fn with_period(section: &str, name: &str, period: &str) -> crate::api::MenuItem {
        let mut item = menu_item(section, name, &[("", 1.0)]);
        item.period = period.to_string();
        item
    }

    fn sample_menu() -> Menu {
        let mut menu = Menu::new();
        menu.push(with_period("Breakfast", "Porridge", "breakfast"));
        menu.push(with_period("Main", "Stew", "LUNCH"));
        menu.push(with_period("Main", "Bread", "Both"));
        menu.push(with_period("Dessert", "Cake", "lunch"));
        menu
    }

    #[test]
    fn test_filter_all_is_identity() {
        let menu = sample_menu();
        assert_eq!(filter_menu_by_period(&menu, "all"), menu);
    }

    #[test]
    fn test_filter_lunch() {
        let lunch = filter_menu_by_period(&sample_menu(), "lunch");
        let sections: Vec<_> = lunch.sections().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(sections, vec!["Main", "Dessert"]);
        assert_eq!(lunch.section("Main").unwrap().items.len(), 2);

        assert_eq!(filter_menu_by_period(&lunch, "lunch"), lunch);
    }

    #[test]
    fn test_filter_breakfast_drops_empty_sections() {
        let breakfast = filter_menu_by_period(&sample_menu(), "Breakfast");
        let names: Vec<_> = breakfast.items().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Porridge", "Bread"]);
        assert!(breakfast.section("Dessert").is_none());
    }

    #[test]
    fn test_current_period() {
        let restaurant = restaurant(&[]);
        let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();

        assert_eq!(current_period(&restaurant, at(6, 59)), Period::All);
        assert_eq!(current_period(&restaurant, at(7, 0)), Period::Breakfast);
        assert_eq!(current_period(&restaurant, at(10, 30)), Period::Breakfast);
        assert_eq!(current_period(&restaurant, at(10, 45)), Period::All);
        assert_eq!(current_period(&restaurant, at(12, 0)), Period::Lunch);
        assert_eq!(current_period(&restaurant, at(15, 0)), Period::Lunch);
        assert_eq!(current_period(&restaurant, at(18, 0)), Period::All);
    }

    #[test]
    fn test_current_period_overlap_prefers_lunch() {
        let mut restaurant = restaurant(&[]);
        restaurant.breakfast_end = TimeOfDay { hour: 12, minute: 0 };
        let at = NaiveTime::from_hms_opt(11, 30, 0).unwrap();
        assert_eq!(current_period(&restaurant, at), Period::Lunch);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(&TimeOfDay { hour: 0, minute: 0 }), "--:--");
        assert_eq!(format_time(&TimeOfDay { hour: 0, minute: 15 }), "12:15 AM");
        assert_eq!(format_time(&TimeOfDay { hour: 9, minute: 5 }), "9:05 AM");
        assert_eq!(format_time(&TimeOfDay { hour: 12, minute: 0 }), "12:00 PM");
        assert_eq!(format_time(&TimeOfDay { hour: 15, minute: 30 }), "3:30 PM");
    }
}
