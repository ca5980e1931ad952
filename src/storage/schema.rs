//! Descriptor of the single `dataset` table.

/// Name of the backing table.
pub const TABLE_NAME: &str = "dataset";

/// A physical column of the `dataset` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Date,
    Channel,
    Country,
    Os,
    Impressions,
    Clicks,
    Installs,
    Spend,
    Revenue,
}

impl Column {
    /// All columns in table order.
    pub const ALL: [Column; 9] = [
        Column::Date,
        Column::Channel,
        Column::Country,
        Column::Os,
        Column::Impressions,
        Column::Clicks,
        Column::Installs,
        Column::Spend,
        Column::Revenue,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Date => "date",
            Column::Channel => "channel",
            Column::Country => "country",
            Column::Os => "os",
            Column::Impressions => "impressions",
            Column::Clicks => "clicks",
            Column::Installs => "installs",
            Column::Spend => "spend",
            Column::Revenue => "revenue",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.name() == name)
    }

    /// Numeric columns are summed when a query groups rows.
    pub fn is_numeric(self) -> bool {
        self.as_dimension().is_none()
    }

    pub fn as_dimension(self) -> Option<Dimension> {
        match self {
            Column::Date => Some(Dimension::Date),
            Column::Channel => Some(Dimension::Channel),
            Column::Country => Some(Dimension::Country),
            Column::Os => Some(Dimension::Os),
            _ => None,
        }
    }
}

/// A non-numeric column. Only these may be filtered on or grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Date,
    Channel,
    Country,
    Os,
}

impl Dimension {
    pub fn column(self) -> Column {
        match self {
            Dimension::Date => Column::Date,
            Dimension::Channel => Column::Channel,
            Dimension::Country => Column::Country,
            Dimension::Os => Column::Os,
        }
    }

    pub fn name(self) -> &'static str {
        self.column().name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_categories() {
        let numeric: Vec<_> = Column::ALL
            .into_iter()
            .filter(|c| c.is_numeric())
            .map(Column::name)
            .collect();
        assert_eq!(numeric, vec!["impressions", "clicks", "installs", "spend", "revenue"]);

        let dimensions: Vec<_> = Column::ALL
            .into_iter()
            .filter_map(Column::as_dimension)
            .map(Dimension::name)
            .collect();
        assert_eq!(dimensions, vec!["date", "channel", "country", "os"]);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Column::from_name("spend"), Some(Column::Spend));
        assert_eq!(Column::from_name("os"), Some(Column::Os));
        assert_eq!(Column::from_name("CPI"), None);
        assert_eq!(Column::from_name("Spend"), None);
    }
}
