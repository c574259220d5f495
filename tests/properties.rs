use common::api::{Menu, MenuItem, PriceMap};
use common::order::{toggle_special, Rejection};
use common::parser::{parse_item_prices, parse_time, split_row};
use common::period::filter_menu_by_period;
use proptest::prelude::*;

fn item(name: String, period: String, specials: Vec<String>, cap: Option<u32>) -> MenuItem {
    MenuItem {
        section: "Main".to_string(),
        category: "Main".to_string(),
        name,
        prices: PriceMap::new(),
        period,
        display_date: String::new(),
        specials,
        special_option: String::new(),
        special_cap: cap,
        description: String::new(),
        sides: vec![],
        veg: vec![],
        gravey: vec![],
    }
}

fn period() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("breakfast".to_string()),
        Just("Lunch".to_string()),
        Just("both".to_string()),
        Just("dinner".to_string()),
    ]
}

proptest! {
    #[test]
    fn parsed_times_stay_on_the_clock(s in "\\PC{0,12}") {
        let time = parse_time(&s);
        prop_assert!(time.hour <= 23);
        prop_assert!(time.minute <= 59);
    }

    #[test]
    fn split_row_never_loses_plain_fields(
        fields in prop::collection::vec("[a-z0-9 ]{0,8}", 1..10)
    ) {
        let row = split_row(&fields.join(","));
        let trimmed: Vec<String> = fields.iter().map(|f| f.trim().to_string()).collect();
        prop_assert_eq!(row, trimmed);
    }

    #[test]
    fn split_row_accepts_anything(line in "\\PC{0,40}") {
        prop_assert!(!split_row(&line).is_empty());
    }

    #[test]
    fn item_prices_keep_one_entry_per_size(s in "([A-Za-z]{0,3}:?\\$?[0-9]{0,3},){0,6}") {
        let prices = parse_item_prices(&s);
        let mut sizes: Vec<&str> = prices.sizes().collect();
        let count = sizes.len();
        sizes.sort();
        sizes.dedup();
        prop_assert_eq!(sizes.len(), count);
    }

    #[test]
    fn period_filter_is_idempotent(
        periods in prop::collection::vec(period(), 0..12),
        wanted in prop_oneof![Just("breakfast"), Just("lunch"), Just("all")],
    ) {
        let mut menu = Menu::new();
        for (i, p) in periods.into_iter().enumerate() {
            menu.push(item(format!("item {}", i), p, vec![], None));
        }

        let once = filter_menu_by_period(&menu, wanted);
        let twice = filter_menu_by_period(&once, wanted);
        prop_assert_eq!(&once, &twice);
        prop_assert!(once.items().all(|i| wanted == "all"
            || i.period.eq_ignore_ascii_case(wanted)
            || i.period == "both"));
    }

    #[test]
    fn specials_never_exceed_the_cap(
        cap in 1u32..4,
        picks in prop::collection::vec(0usize..6, 0..20),
    ) {
        let specials: Vec<String> = (0..6).map(|i| format!("special {}", i)).collect();
        let stew = item("Stew".to_string(), "both".to_string(), specials.clone(), Some(cap));

        let mut selected: Vec<String> = vec![];
        for pick in picks {
            match toggle_special(&stew, &selected, &specials[pick], true) {
                Ok(next) => selected = next,
                Err(rejection) => {
                    prop_assert_eq!(rejection, Rejection::SpecialLimit(cap));
                    prop_assert_eq!(selected.len(), cap as usize);
                }
            }
            prop_assert!(selected.len() <= cap as usize);
        }
    }
}
