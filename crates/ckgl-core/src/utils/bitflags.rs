// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Declares the `ckgl_bitflags!` macro used for masks such as `ClearFlags` and `ColorMask`.

/// Defines a bitflag set over an unsigned integer type.
///
/// Unlike a plain newtype, the generated type knows which bits are meaningful:
/// [`from_bits`](#method.from_bits) rejects raw values carrying undefined bits so that
/// masks coming from configuration or FFI can be validated before reaching a backend.
#[macro_export]
#[doc(hidden)]
macro_rules! ckgl_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            bits: $ty,
        }

        impl $name {
            /// An empty set of flags.
            pub const EMPTY: Self = Self { bits: 0 };

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            /// Every bit that belongs to at least one named flag.
            pub const fn known_bits() -> $ty {
                0 $(| $flag_value)*
            }

            /// Builds a set from raw bits, returning `None` if any bit is not a named flag.
            pub const fn from_bits(bits: $ty) -> Option<Self> {
                if bits & !Self::known_bits() == 0 {
                    Some(Self { bits })
                } else {
                    None
                }
            }

            /// Builds a set from raw bits, silently dropping unknown bits.
            pub const fn from_bits_truncate(bits: $ty) -> Self {
                Self { bits: bits & Self::known_bits() }
            }

            /// Returns the raw value of the set.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// Returns `true` if no flag is set.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// Returns `true` if all flags in `other` are contained within `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// Returns `true` if any flag in `other` is contained within `self`.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }

            /// Inserts the flags in `other` into `self`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Removes the flags in `other` from `self`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }

            /// Returns a copy of `self` with `other` inserted.
            #[must_use]
            pub const fn with(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }

            /// Returns a copy of `self` with `other` removed.
            #[must_use]
            pub const fn without(self, other: Self) -> Self {
                Self { bits: self.bits & !other.bits }
            }
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }
        }

        impl core::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, other: Self) -> Self {
                Self { bits: self.bits & other.bits }
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.bits |= other.bits;
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut remaining = self.bits;
                let mut names: [&'static str; 32] = [""; 32];
                let mut count = 0usize;
                $(
                    if $flag_value != 0 && (remaining & $flag_value) == $flag_value && count < 32 {
                        names[count] = stringify!($flag_name);
                        count += 1;
                        remaining &= !$flag_value;
                    }
                )*
                write!(f, "{}(", stringify!($name))?;
                if count == 0 {
                    write!(f, "EMPTY")?;
                }
                for (i, name) in names[..count].iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{name}")?;
                }
                write!(f, ")")
            }
        }
    };
}
