// Typed option cells and the descriptor table every category exposes
//
// Categories are plain structs of `Option<T>` fields. The `option_category!`
// macro generates, next to the struct, a static descriptor table (cell name,
// declared type, yt-dlp flag) and name-based accessors. The codec and the
// argument builder only ever walk that table.

use std::fmt;
use time::OffsetDateTime;

use super::rate::Rate;
use crate::downloader::errors::CodecError;

/// Declared runtime type of a cell. Fixed at definition time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    Bool,
    Int,
    Double,
    String,
    Timestamp,
    Rate,
    Enum,
}

impl OptionType {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::Int => "integer",
            Self::Double => "number",
            Self::String => "string",
            Self::Timestamp => "timestamp string",
            Self::Rate => "rate string",
            Self::Enum => "integer code",
        }
    }
}

/// Type-erased value of a single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Timestamp(OffsetDateTime),
    Rate(Rate),
    /// Enumerations travel as their integer code only
    Enum(i64),
}

/// Static description of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellDescriptor {
    /// Key used in the serialized document
    pub name: &'static str,
    pub kind: OptionType,
    /// Command-line flag passed to yt-dlp
    pub flag: &'static str,
}

/// Rust types that can live in a cell.
pub trait CellValue: Sized {
    const KIND: OptionType;

    fn to_value(&self) -> OptionValue;

    /// `None` when `value` is of another kind (or an unknown enum code)
    fn from_value(value: OptionValue) -> Option<Self>;

    /// Text passed after the flag on the command line
    fn to_arg(&self) -> String;

    fn push_args(&self, flag: &str, out: &mut Vec<String>) {
        out.push(flag.to_string());
        out.push(self.to_arg());
    }
}

impl CellValue for bool {
    const KIND: OptionType = OptionType::Bool;

    fn to_value(&self) -> OptionValue {
        OptionValue::Bool(*self)
    }

    fn from_value(value: OptionValue) -> Option<Self> {
        match value {
            OptionValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    fn to_arg(&self) -> String {
        self.to_string()
    }

    /// Switches: present when true, absent otherwise
    fn push_args(&self, flag: &str, out: &mut Vec<String>) {
        if *self {
            out.push(flag.to_string());
        }
    }
}

impl CellValue for i64 {
    const KIND: OptionType = OptionType::Int;

    fn to_value(&self) -> OptionValue {
        OptionValue::Int(*self)
    }

    fn from_value(value: OptionValue) -> Option<Self> {
        match value {
            OptionValue::Int(i) => Some(i),
            _ => None,
        }
    }

    fn to_arg(&self) -> String {
        self.to_string()
    }
}

impl CellValue for f64 {
    const KIND: OptionType = OptionType::Double;

    fn to_value(&self) -> OptionValue {
        OptionValue::Double(*self)
    }

    fn from_value(value: OptionValue) -> Option<Self> {
        match value {
            OptionValue::Double(d) => Some(d),
            _ => None,
        }
    }

    fn to_arg(&self) -> String {
        self.to_string()
    }
}

impl CellValue for String {
    const KIND: OptionType = OptionType::String;

    fn to_value(&self) -> OptionValue {
        OptionValue::String(self.clone())
    }

    fn from_value(value: OptionValue) -> Option<Self> {
        match value {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    fn to_arg(&self) -> String {
        self.clone()
    }
}

impl CellValue for OffsetDateTime {
    const KIND: OptionType = OptionType::Timestamp;

    fn to_value(&self) -> OptionValue {
        OptionValue::Timestamp(*self)
    }

    fn from_value(value: OptionValue) -> Option<Self> {
        match value {
            OptionValue::Timestamp(t) => Some(t),
            _ => None,
        }
    }

    /// yt-dlp takes dates as YYYYMMDD
    fn to_arg(&self) -> String {
        format!(
            "{:04}{:02}{:02}",
            self.year(),
            u8::from(self.month()),
            self.day()
        )
    }
}

impl CellValue for Rate {
    const KIND: OptionType = OptionType::Rate;

    fn to_value(&self) -> OptionValue {
        OptionValue::Rate(*self)
    }

    fn from_value(value: OptionValue) -> Option<Self> {
        match value {
            OptionValue::Rate(r) => Some(r),
            _ => None,
        }
    }

    fn to_arg(&self) -> String {
        self.to_string()
    }
}

/// A named, fixed group of cells.
///
/// Implemented by `option_category!`; object safe so a model can hand out its
/// categories as `&dyn OptionCategory` in definition order.
pub trait OptionCategory: fmt::Debug {
    fn name(&self) -> &'static str;

    fn cells(&self) -> &'static [CellDescriptor];

    fn get(&self, cell: &str) -> Option<OptionValue>;

    /// Fails with `UnknownCell` for names outside [`cells`](Self::cells) and
    /// `TypeMismatch` when `value` does not fit the field.
    fn set(&mut self, cell: &str, value: OptionValue) -> Result<(), CodecError>;

    /// Append `flag [value]` for every present cell
    fn push_args(&self, out: &mut Vec<String>);

    fn descriptor(&self, cell: &str) -> Option<&'static CellDescriptor> {
        self.cells().iter().find(|d| d.name == cell)
    }
}

/// A full configuration: a fixed set of uniquely named categories.
pub trait ConfigModel: Default {
    /// All categories, in definition order
    fn categories(&self) -> Vec<&dyn OptionCategory>;

    fn category_mut(&mut self, name: &str) -> Option<&mut dyn OptionCategory>;
}

macro_rules! option_category {
    (
        $(#[$meta:meta])*
        $vis:vis struct $ty:ident($name:literal) {
            $(
                $(#[$fmeta:meta])*
                $field:ident: $fty:ty => ($key:literal, $flag:literal),
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $ty {
            $(
                $(#[$fmeta])*
                pub $field: Option<$fty>,
            )*
        }

        impl $ty {
            pub const NAME: &'static str = $name;

            pub const CELLS: &'static [$crate::downloader::options::cell::CellDescriptor] = &[
                $(
                    $crate::downloader::options::cell::CellDescriptor {
                        name: $key,
                        kind: <$fty as $crate::downloader::options::cell::CellValue>::KIND,
                        flag: $flag,
                    },
                )*
            ];
        }

        impl $crate::downloader::options::cell::OptionCategory for $ty {
            fn name(&self) -> &'static str {
                Self::NAME
            }

            fn cells(&self) -> &'static [$crate::downloader::options::cell::CellDescriptor] {
                Self::CELLS
            }

            fn get(&self, cell: &str) -> Option<$crate::downloader::options::cell::OptionValue> {
                use $crate::downloader::options::cell::CellValue;
                match cell {
                    $( $key => self.$field.as_ref().map(CellValue::to_value), )*
                    _ => None,
                }
            }

            fn set(
                &mut self,
                cell: &str,
                value: $crate::downloader::options::cell::OptionValue,
            ) -> Result<(), $crate::downloader::errors::CodecError> {
                use $crate::downloader::options::cell::CellValue;
                match cell {
                    $(
                        $key => {
                            let typed = <$fty as CellValue>::from_value(value).ok_or_else(|| {
                                $crate::downloader::errors::CodecError::TypeMismatch {
                                    cell: cell.to_string(),
                                    expected: <$fty as CellValue>::KIND.describe(),
                                    found: "value of another kind".to_string(),
                                }
                            })?;
                            self.$field = Some(typed);
                            Ok(())
                        }
                    )*
                    _ => Err($crate::downloader::errors::CodecError::UnknownCell {
                        category: Self::NAME.to_string(),
                        cell: cell.to_string(),
                    }),
                }
            }

            fn push_args(&self, out: &mut Vec<String>) {
                use $crate::downloader::options::cell::CellValue;
                $(
                    if let Some(value) = &self.$field {
                        value.push_args($flag, out);
                    }
                )*
            }
        }
    };
}

macro_rules! option_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $ty:ident {
            $( $variant:ident = $code:literal => $arg:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        $vis enum $ty {
            $( $variant = $code, )*
        }

        impl $crate::downloader::options::cell::CellValue for $ty {
            const KIND: $crate::downloader::options::cell::OptionType =
                $crate::downloader::options::cell::OptionType::Enum;

            fn to_value(&self) -> $crate::downloader::options::cell::OptionValue {
                $crate::downloader::options::cell::OptionValue::Enum(*self as i64)
            }

            fn from_value(value: $crate::downloader::options::cell::OptionValue) -> Option<Self> {
                use $crate::downloader::options::cell::OptionValue;
                match value {
                    $( OptionValue::Enum($code) => Some(Self::$variant), )*
                    _ => None,
                }
            }

            fn to_arg(&self) -> String {
                match self {
                    $( Self::$variant => $arg.to_string(), )*
                }
            }
        }
    };
}

pub(crate) use option_category;
pub(crate) use option_enum;
