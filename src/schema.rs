//! Record shapes for the two CSV exports and their positional column maps.

/// Column positions in users.csv (schema v1). The file carries more columns
/// than the record uses; the positions here are the contract — reordering
/// columns in the source silently corrupts the mapping.
pub mod user_columns {
    pub const ID: usize = 0;
    pub const FIRST_NAME: usize = 1;
    pub const LAST_NAME: usize = 2;
    pub const EMAIL: usize = 3;
    pub const AGE: usize = 4;
    pub const GENDER: usize = 5;
    pub const COUNTRY: usize = 10;
    pub const TRAFFIC_SOURCE: usize = 13;
    pub const CREATED_AT: usize = 14;
}

/// Column positions in orders.csv (schema v1).
pub mod order_columns {
    pub const ORDER_ID: usize = 0;
    pub const USER_ID: usize = 1;
    pub const STATUS: usize = 2;
    pub const GENDER: usize = 3;
    pub const CREATED_AT: usize = 4;
    pub const RETURNED_AT: usize = 5;
    pub const SHIPPED_AT: usize = 6;
    pub const DELIVERED_AT: usize = 7;
    pub const NUM_OF_ITEM: usize = 8;
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// `None` when the source field is not an integer.
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// `None` when unparseable; aggregators treat it as "unknown".
    pub age: Option<i64>,
    pub gender: String,
    /// May be empty.
    pub country: String,
    pub traffic_source: String,
    /// Raw date string; parsed lazily by the views that need it.
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: Option<i64>,
    /// Logical foreign key to `User.id`; not enforced.
    pub user_id: Option<i64>,
    /// Raw status string, preserved verbatim even outside the known set.
    pub status: String,
    pub gender: String,
    pub created_at: String,
    pub returned_at: String,
    pub shipped_at: String,
    pub delivered_at: String,
    /// Defaults to 0 when the source field is unparseable.
    pub num_of_item: u32,
}

/// Best-effort integer parse. Anything that isn't a plain integer yields
/// `None` rather than an error.
pub fn lenient_int(field: &str) -> Option<i64> {
    field.trim().parse::<i64>().ok()
}

/// Missing indices on short rows project to an empty field.
fn field(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

impl User {
    pub fn from_row(row: &[String]) -> Self {
        use user_columns as col;
        Self {
            id: lenient_int(field(row, col::ID)),
            first_name: field(row, col::FIRST_NAME).to_string(),
            last_name: field(row, col::LAST_NAME).to_string(),
            email: field(row, col::EMAIL).to_string(),
            age: lenient_int(field(row, col::AGE)),
            gender: field(row, col::GENDER).to_string(),
            country: field(row, col::COUNTRY).to_string(),
            traffic_source: field(row, col::TRAFFIC_SOURCE).to_string(),
            created_at: field(row, col::CREATED_AT).to_string(),
        }
    }
}

impl Order {
    pub fn from_row(row: &[String]) -> Self {
        use order_columns as col;
        Self {
            order_id: lenient_int(field(row, col::ORDER_ID)),
            user_id: lenient_int(field(row, col::USER_ID)),
            status: field(row, col::STATUS).to_string(),
            gender: field(row, col::GENDER).to_string(),
            created_at: field(row, col::CREATED_AT).to_string(),
            returned_at: field(row, col::RETURNED_AT).to_string(),
            shipped_at: field(row, col::SHIPPED_AT).to_string(),
            delivered_at: field(row, col::DELIVERED_AT).to_string(),
            num_of_item: lenient_int(field(row, col::NUM_OF_ITEM))
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0),
        }
    }
}

/// The five statuses the views bucket on, plus an explicit catch-all so that
/// "unknown status ignored" is a visible match arm rather than an implicit
/// key-existence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Complete,
    Shipped,
    Processing,
    Cancelled,
    Returned,
    Other,
}

impl OrderStatus {
    /// Total mapping from the raw status string. Case-sensitive: the source
    /// data uses exactly these spellings.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "Complete" => OrderStatus::Complete,
            "Shipped" => OrderStatus::Shipped,
            "Processing" => OrderStatus::Processing,
            "Cancelled" => OrderStatus::Cancelled,
            "Returned" => OrderStatus::Returned,
            _ => OrderStatus::Other,
        }
    }

    /// Chart color token for the status breakdown view. Unrecognized
    /// statuses fall back to the first token.
    pub fn color_token(raw: &str) -> &'static str {
        match Self::from_raw(raw) {
            OrderStatus::Complete => "var(--chart-1)",
            OrderStatus::Shipped => "var(--chart-2)",
            OrderStatus::Processing => "var(--chart-3)",
            OrderStatus::Cancelled => "var(--chart-4)",
            OrderStatus::Returned => "var(--chart-5)",
            OrderStatus::Other => "var(--chart-1)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_lenient_int() {
        assert_eq!(lenient_int("42"), Some(42));
        assert_eq!(lenient_int(" 42 "), Some(42));
        assert_eq!(lenient_int("-7"), Some(-7));
        assert_eq!(lenient_int("thirty"), None);
        assert_eq!(lenient_int(""), None);
        assert_eq!(lenient_int("3.5"), None);
    }

    #[test]
    fn test_user_from_row() {
        let mut fields = vec![""; 15];
        fields[user_columns::ID] = "12";
        fields[user_columns::FIRST_NAME] = "Ana";
        fields[user_columns::LAST_NAME] = "Silva";
        fields[user_columns::EMAIL] = "ana@example.com";
        fields[user_columns::AGE] = "34";
        fields[user_columns::GENDER] = "F";
        fields[user_columns::COUNTRY] = "Brasil";
        fields[user_columns::TRAFFIC_SOURCE] = "Search";
        fields[user_columns::CREATED_AT] = "2023-04-02 11:30:00";
        let user = User::from_row(&row(&fields));

        assert_eq!(user.id, Some(12));
        assert_eq!(user.age, Some(34));
        assert_eq!(user.country, "Brasil");
        assert_eq!(user.traffic_source, "Search");
        assert_eq!(user.created_at, "2023-04-02 11:30:00");
    }

    #[test]
    fn test_user_from_short_row_defaults() {
        // A row with fewer columns than the schema projects empty/None.
        let user = User::from_row(&row(&["9", "Bo"]));
        assert_eq!(user.id, Some(9));
        assert_eq!(user.first_name, "Bo");
        assert_eq!(user.age, None);
        assert_eq!(user.country, "");
        assert_eq!(user.created_at, "");
    }

    #[test]
    fn test_unparseable_age_is_none() {
        let mut fields = vec![""; 15];
        fields[user_columns::AGE] = "thirty";
        let user = User::from_row(&row(&fields));
        assert_eq!(user.age, None);
    }

    #[test]
    fn test_order_from_row() {
        let order = Order::from_row(&row(&[
            "100",
            "12",
            "Complete",
            "F",
            "2023-01-15",
            "",
            "2023-01-16",
            "2023-01-18",
            "3",
        ]));
        assert_eq!(order.order_id, Some(100));
        assert_eq!(order.user_id, Some(12));
        assert_eq!(order.status, "Complete");
        assert_eq!(order.num_of_item, 3);
        assert_eq!(order.returned_at, "");
    }

    #[test]
    fn test_num_of_item_defaults_to_zero() {
        let order = Order::from_row(&row(&[
            "1", "2", "Shipped", "M", "2023-01-01", "", "", "", "many",
        ]));
        assert_eq!(order.num_of_item, 0);

        // Negative counts are out of domain and also default.
        let order = Order::from_row(&row(&[
            "1", "2", "Shipped", "M", "2023-01-01", "", "", "", "-4",
        ]));
        assert_eq!(order.num_of_item, 0);
    }

    #[test]
    fn test_status_mapping_is_total() {
        assert_eq!(OrderStatus::from_raw("Complete"), OrderStatus::Complete);
        assert_eq!(OrderStatus::from_raw("Returned"), OrderStatus::Returned);
        assert_eq!(OrderStatus::from_raw("complete"), OrderStatus::Other);
        assert_eq!(OrderStatus::from_raw("Refunded"), OrderStatus::Other);
        assert_eq!(OrderStatus::from_raw(""), OrderStatus::Other);
    }

    #[test]
    fn test_color_tokens() {
        assert_eq!(OrderStatus::color_token("Complete"), "var(--chart-1)");
        assert_eq!(OrderStatus::color_token("Returned"), "var(--chart-5)");
        // Unrecognized statuses get the default token.
        assert_eq!(OrderStatus::color_token("Refunded"), "var(--chart-1)");
    }
}
