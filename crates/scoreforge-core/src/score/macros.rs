//! Declarative macros shared by the field-based score types.

/// Generates `PartialOrd`, `Ord`, `Add`, `Sub`, and `Neg` for a field-based score type.
///
/// Fields must be listed from highest to lowest priority; ordering is
/// lexicographic over that list.
///
/// # Usage
/// ```ignore
/// impl_score_ops!(HardSoftScore { hard, soft } => of);
/// ```
macro_rules! impl_score_ops {
    ($type:ident { $($field:ident),+ } => $ctor:ident) => {
        impl PartialOrd for $type {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $type {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                std::cmp::Ordering::Equal
                    $( .then_with(|| self.$field.cmp(&other.$field)) )+
            }
        }

        impl std::ops::Add for $type {
            type Output = Self;

            fn add(self, other: Self) -> Self {
                $type::$ctor( $(self.$field + other.$field),+ )
            }
        }

        impl std::ops::Sub for $type {
            type Output = Self;

            fn sub(self, other: Self) -> Self {
                $type::$ctor( $(self.$field - other.$field),+ )
            }
        }

        impl std::ops::Neg for $type {
            type Output = Self;

            fn neg(self) -> Self {
                $type::$ctor( $(-self.$field),+ )
            }
        }
    };
}

/// Generates `scale`, `multiply`, `divide`, and `abs` inside an `impl Score` block.
///
/// # Usage
/// ```ignore
/// impl Score for HardSoftScore {
///     // ...other methods...
///     impl_score_scale!(HardSoftScore { hard, soft } => of);
/// }
/// ```
macro_rules! impl_score_scale {
    ($type:ident { $($field:ident),+ } => $ctor:ident) => {
        fn scale(&self, factor: i64) -> Self {
            $type::$ctor( $( self.$field * factor ),+ )
        }

        fn multiply(&self, multiplicand: f64) -> Self {
            $type::$ctor( $( (self.$field as f64 * multiplicand).round() as i64 ),+ )
        }

        fn divide(&self, divisor: f64) -> Self {
            $type::$ctor( $( (self.$field as f64 / divisor).round() as i64 ),+ )
        }

        fn abs(&self) -> Self {
            $type::$ctor( $( self.$field.abs() ),+ )
        }
    };
}

/// Generates `ParseableScore` for scores using the `"Xsuffix/Ysuffix"` format.
///
/// # Usage
/// ```ignore
/// impl_score_parse!(HardSoftScore { hard => "hard", soft => "soft" } => of);
/// ```
macro_rules! impl_score_parse {
    ($type:ident { $($field:ident => $suffix:literal),+ } => $ctor:ident) => {
        impl $crate::score::traits::ParseableScore for $type {
            fn parse(s: &str) -> Result<Self, $crate::score::traits::ScoreParseError> {
                let s = s.trim();
                let parts: Vec<&str> = s.split('/').collect();
                let suffixes: &[&str] = &[ $($suffix),+ ];

                if parts.len() != suffixes.len() {
                    return Err($crate::score::traits::ScoreParseError::new(format!(
                        "Invalid {} format '{}': expected {} parts separated by '/'",
                        stringify!($type),
                        s,
                        suffixes.len()
                    )));
                }

                let mut parts = parts.into_iter();
                $(
                    let $field = {
                        let part = parts.next().unwrap_or_default().trim();
                        let digits = part.strip_suffix($suffix).ok_or_else(|| {
                            $crate::score::traits::ScoreParseError::new(format!(
                                "{} part '{}' must end with '{}'",
                                stringify!($field), part, $suffix
                            ))
                        })?;
                        digits.parse::<i64>().map_err(|e| {
                            $crate::score::traits::ScoreParseError::new(format!(
                                "Invalid {} score '{}': {}",
                                $suffix, digits, e
                            ))
                        })?
                    };
                )+

                Ok($type::$ctor( $($field),+ ))
            }

            fn to_string_repr(&self) -> String {
                let parts: Vec<String> = vec![ $( format!("{}{}", self.$field, $suffix) ),+ ];
                parts.join("/")
            }
        }
    };
}
