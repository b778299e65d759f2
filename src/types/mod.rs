mod parser;
mod span;

/// Broad classification of a column type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Category {
    /// Scalar value
    Primitive,

    /// `array<T>`
    List,

    /// `map<K,V>`
    Map,

    /// `struct<name:T,...>`
    Struct,
}

/// Declared type of an input column, as reported by the host engine.
///
/// Type names follow the engine's canonical lower-case spelling:
///
/// ```
/// use colmean::TypeDescriptor;
///
/// let ty = TypeDescriptor::try_from("array<int>")?;
/// assert_eq!(TypeDescriptor::Array(Box::new(TypeDescriptor::Int)), ty);
/// assert_eq!("array<int>", ty.to_string());
/// #
/// # Ok::<(), colmean::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// `boolean`
    Boolean,

    /// `tinyint`
    TinyInt,

    /// `smallint`
    SmallInt,

    /// `int`, 32-bit signed integer
    Int,

    /// `bigint`
    BigInt,

    /// `float`, single precision
    Float,

    /// `double`, double precision
    Double,

    /// `string`
    String,

    /// `timestamp`
    Timestamp,

    /// `array<T>`
    Array(Box<Self>),

    /// `map<K,V>`
    Map(Box<Self>, Box<Self>),

    /// `struct<name:T,...>`
    Struct(Vec<(String, Self)>),
}

impl TypeDescriptor {
    /// Parses a canonical type name, e.g. `double` or `map<string,int>`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidTypeName`] if the name is not understood.
    pub fn parse(name: &str) -> crate::Result<Self> {
        parser::parse_type_name(name)
    }

    /// Returns the category of this type.
    #[must_use]
    pub fn category(&self) -> Category {
        match self {
            Self::Array(_) => Category::List,
            Self::Map(_, _) => Category::Map,
            Self::Struct(_) => Category::Struct,
            _ => Category::Primitive,
        }
    }

    /// Returns `true` if a mean can be computed over a column of this type.
    #[must_use]
    pub fn is_mean_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::Double)
    }
}

impl std::fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::TinyInt => write!(f, "tinyint"),
            Self::SmallInt => write!(f, "smallint"),
            Self::Int => write!(f, "int"),
            Self::BigInt => write!(f, "bigint"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::String => write!(f, "string"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::Array(inner) => write!(f, "array<{inner}>"),
            Self::Map(key, value) => write!(f, "map<{key},{value}>"),
            Self::Struct(fields) => {
                write!(f, "struct<")?;
                for (idx, (name, ty)) in fields.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{name}:{ty}")?;
                }
                write!(f, ">")
            }
        }
    }
}

impl TryFrom<&str> for TypeDescriptor {
    type Error = crate::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl std::str::FromStr for TypeDescriptor {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
