use common_money::Money;

use crate::orders::model::OrderItemOption;
use crate::restaurants::model::DishOption;

/// Price of one ordered dish including option surcharges.
///
/// A requested option adds the dish option's flat `extra` when it has a
/// non-zero one; otherwise the surcharge of the requested choice, if any.
/// Options and choices the dish does not offer add nothing.
pub fn item_price(base: &Money, offered: &[DishOption], requested: &[OrderItemOption]) -> Money {
    let mut price = base.clone();
    for wanted in requested {
        let Some(option) = offered.iter().find(|option| option.name == wanted.name) else {
            continue;
        };
        if let Some(extra) = option.extra.as_ref().filter(|extra| !extra.is_zero()) {
            price += extra;
            continue;
        }
        let choice_extra = wanted
            .choice
            .as_deref()
            .zip(option.choices.as_deref())
            .and_then(|(wanted_choice, choices)| choices.iter().find(|choice| choice.name == wanted_choice))
            .and_then(|choice| choice.extra.as_ref());
        if let Some(extra) = choice_extra {
            price += extra;
        }
    }
    price
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restaurants::model::DishChoice;

    fn pick(name: &str, choice: Option<&str>) -> OrderItemOption {
        OrderItemOption {
            name: name.to_string(),
            choice: choice.map(str::to_string),
        }
    }

    fn menu_options() -> Vec<DishOption> {
        vec![
            DishOption {
                name: "Spice Level".into(),
                choices: Some(vec![
                    DishChoice { name: "Mild".into(), extra: None },
                    DishChoice { name: "Kill me".into(), extra: Some(Money::from_cents(200)) },
                ]),
                extra: None,
            },
            DishOption {
                name: "Pickle".into(),
                choices: None,
                extra: Some(Money::from_cents(100)),
            },
            DishOption {
                name: "Size".into(),
                choices: Some(vec![DishChoice { name: "XL".into(), extra: Some(Money::from_cents(500)) }]),
                extra: Some(Money::zero()),
            },
        ]
    }

    #[test]
    fn base_price_without_options() {
        let price = item_price(&Money::from_cents(1_200), &menu_options(), &[]);
        assert_eq!(price, Money::from_cents(1_200));
    }

    #[test]
    fn flat_extra_and_choice_extra_add_up() {
        let requested = [pick("Pickle", None), pick("Spice Level", Some("Kill me"))];
        let price = item_price(&Money::from_cents(1_200), &menu_options(), &requested);
        assert_eq!(price, Money::from_cents(1_500));
    }

    #[test]
    fn zero_flat_extra_falls_through_to_choice() {
        let price = item_price(&Money::from_cents(1_000), &menu_options(), &[pick("Size", Some("XL"))]);
        assert_eq!(price, Money::from_cents(1_500));
    }

    #[test]
    fn unknown_options_and_choices_add_nothing() {
        let requested = [
            pick("Extra Cheese", Some("Lots")),
            pick("Spice Level", Some("Volcano")),
            pick("Spice Level", Some("Mild")),
            pick("Spice Level", None),
        ];
        let price = item_price(&Money::from_cents(800), &menu_options(), &requested);
        assert_eq!(price, Money::from_cents(800));
    }
}
