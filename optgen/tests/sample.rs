//! Behavioural tests for the options generated for a representative config.
//!
//! The config covers every field shape: scalars with and without defaults,
//! renames, skipped fields, opaque values, imported types, inline records,
//! variadic sequences and presence-tracked values.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow, ensure};
use optgen::OptionError;
use rstest::rstest;

#[optgen::generate]
mod sample {
    use std::net;
    use std::time;
    use std::time as time2;

    use optgen::Dynamic;

    /// Exists so the generated option for `my_renamed_int` would clash with
    /// it if the rename did not replace the field-derived name.
    #[derive(Debug)]
    pub struct OptionMyRenamedInt;

    #[options(inline)]
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Pair {
        pub a: i32,
        pub b: i32,
    }

    #[options(inline)]
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct WithDefault {
        #[options = ",1"]
        pub a: i32,
    }

    #[options(inline)]
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct WithVariadic {
        pub a: i32,
        #[options = "..."]
        pub b: Vec<i32>,
    }

    #[options(
        namespace = "OptionNs",
        prefix = "Option",
        suffix = "",
        imports = "std::time, std::net, time2 = std::time",
        public = true
    )]
    pub struct Config {
        pub my_int: i32,
        #[options = ",1"]
        pub my_int_with_default: i32,
        #[options = "yourInt"]
        pub my_renamed_int: i32,

        /// Does something.
        pub my_documented_int: i32,

        pub my_float: f64,
        #[options = ",1.23"]
        pub my_float_with_default: f64,

        pub my_string: String,
        #[options = ",default string"]
        pub my_string_with_default: String,
        #[options = "-"]
        pub my_string_without_option: String,

        pub my_func: Option<fn() -> i32>,
        pub my_dynamic: Option<Dynamic>,

        #[options = ",net::Ipv4Addr::LOCALHOST"]
        pub my_address: net::Ipv4Addr,
        pub my_duration: time::Duration,
        pub my_duration2: time2::Duration,

        pub my_struct: Pair,
        pub my_struct_with_default: WithDefault,
        pub my_pointer_to_struct: Option<Box<Pair>>,
        pub my_struct_with_variadic_slice: WithVariadic,

        #[options = "..."]
        pub my_slice: Vec<i32>,
        #[options = "..."]
        pub my_pointer_to_slice: Option<Vec<i32>>,
        #[options = "yourSlice..."]
        pub my_renamed_slice: Vec<i32>,

        #[options = "*"]
        pub my_pointer_to_int: Option<i32>,
        #[options = "*yourIntWithPointer"]
        pub my_pointer_to_renamed_int: Option<i32>,

        #[doc(hidden)]
        pub with_other_tag_but_no_options: String,
        #[doc(hidden)]
        #[options = "gotBoth"]
        pub with_both_tags: String,
    }
}

use sample::{
    Config, ConfigOption, OptionMyInt, OptionNs, Pair, WithDefault, WithVariadic,
    apply_config_options, new_config,
};

struct SetMyInt123;

impl ConfigOption for SetMyInt123 {
    fn apply(&self, target: &mut Config) -> Result<(), OptionError> {
        target.my_int = 123;
        Ok(())
    }
}

struct MakeError;

impl ConfigOption for MakeError {
    fn apply(&self, _target: &mut Config) -> Result<(), OptionError> {
        Err("bad news".into())
    }
}

fn build(options: &[&dyn ConfigOption]) -> Result<Config> {
    new_config(options).map_err(|err| anyhow!(err))
}

fn apply(config: &mut Config, options: &[&dyn ConfigOption]) -> Result<()> {
    apply_config_options(config, options).map_err(|err| anyhow!(err))
}

fn zero() -> i32 {
    0
}

/// Exact comparison; option values are copied, never computed.
fn same(actual: f64, expected: f64) -> bool {
    actual.to_bits() == expected.to_bits()
}

#[test]
fn options_set_config_values() -> Result<()> {
    let mut config = build(&[])?;
    let func: fn() -> i32 = zero;
    let dynamic: optgen::Dynamic = Arc::new(789_i32);
    apply(
        &mut config,
        &[
            &OptionNs::my_int(123),
            &OptionNs::my_float(4.56),
            &OptionNs::my_string("my-string".to_owned()),
            &OptionNs::my_func(Some(func)),
            &OptionNs::my_dynamic(Some(dynamic)),
        ],
    )?;
    ensure!(config.my_int == 123);
    ensure!(same(config.my_float, 4.56));
    ensure!(config.my_string == "my-string");
    ensure!(config.my_func.map(|f| f()) == Some(0));
    let stored = config
        .my_dynamic
        .as_ref()
        .and_then(|value| value.downcast_ref::<i32>());
    ensure!(stored == Some(&789), "dynamic value not stored: {stored:?}");
    Ok(())
}

#[test]
fn build_applies_options() -> Result<()> {
    let config = build(&[&OptionNs::my_int(123)])?;
    ensure!(config.my_int == 123);
    Ok(())
}

#[test]
fn build_seeds_defaults() -> Result<()> {
    let config = build(&[])?;
    ensure!(config.my_int == 0);
    ensure!(config.my_int_with_default == 1);
    ensure!(config.my_string_with_default == "default string");
    ensure!(same(config.my_float_with_default, 1.23));
    ensure!(config.my_address == std::net::Ipv4Addr::LOCALHOST);
    ensure!(config.my_string_without_option.is_empty());
    ensure!(config.my_func.is_none() && config.my_dynamic.is_none());
    Ok(())
}

#[test]
fn later_options_win() -> Result<()> {
    let config = build(&[&OptionNs::my_int(1), &OptionNs::my_int(2)])?;
    ensure!(config.my_int == 2);
    Ok(())
}

#[test]
fn options_touch_only_their_field() -> Result<()> {
    let mut config = build(&[&OptionNs::my_float(4.56), &OptionNs::my_int(7)])?;
    apply(&mut config, &[&OptionNs::my_int(8)])?;
    ensure!(config.my_int == 8);
    ensure!(same(config.my_float, 4.56));
    ensure!(config.my_int_with_default == 1);
    Ok(())
}

#[test]
fn options_compare_by_value() {
    assert!(OptionNs::my_int(1) == OptionNs::my_int(1));
    assert!(OptionNs::my_int(1) != OptionNs::my_int(2));
    assert!(OptionNs::my_slice([1, 2]) == OptionNs::my_slice(vec![1, 2]));
    assert!(
        OptionNs::my_struct_with_variadic_slice(1, [1, 2])
            == OptionNs::my_struct_with_variadic_slice(1, [1, 2])
    );
}

#[test]
fn options_can_be_cloned_and_reapplied() -> Result<()> {
    let option: OptionMyInt = OptionNs::my_int(5);
    let copy = option.clone();
    let config = build(&[&option, &copy])?;
    ensure!(config.my_int == 5);
    Ok(())
}

#[rstest]
#[case::int(OptionNs::my_int(1).to_string(), "MyInt: 1")]
#[case::string(OptionNs::my_string("abc".to_owned()).to_string(), "MyString: abc")]
#[case::float(OptionNs::my_float(1.5).to_string(), "MyFloat: 1.5")]
#[case::pointer(OptionNs::my_pointer_to_int(1).to_string(), "MyPointerToInt: 1")]
#[case::slice(OptionNs::my_slice([1, 2]).to_string(), "MySlice: [1 2]")]
#[case::empty_slice(OptionNs::my_slice(Vec::new()).to_string(), "MySlice: []")]
#[case::record(OptionNs::my_struct(1, 2).to_string(), "MyStruct: {a:1 b:2}")]
#[case::record_with_slice(
    OptionNs::my_struct_with_variadic_slice(1, [2]).to_string(),
    "MyStructWithVariadicSlice: {a:1 b:[2]}"
)]
#[case::callable(OptionNs::my_func(None).to_string(), "MyFunc: <func>")]
#[case::dynamic(OptionNs::my_dynamic(None).to_string(), "MyDynamic: <dynamic>")]
#[case::renamed(OptionNs::your_int(3).to_string(), "YourInt: 3")]
fn options_render_readably(#[case] rendered: String, #[case] expected: &str) {
    assert_eq!(rendered, expected);
}

#[test]
fn errors_from_custom_options_are_returned_unchanged() -> Result<()> {
    let mut config = build(&[])?;
    let Err(err) = apply_config_options(&mut config, &[&MakeError]) else {
        return Err(anyhow!("custom option error should surface"));
    };
    ensure!(err.to_string() == "bad news");

    let Err(build_err) = new_config(&[&MakeError]) else {
        return Err(anyhow!("build should surface option errors"));
    };
    ensure!(build_err.to_string() == "bad news");
    Ok(())
}

#[test]
fn failing_option_stops_the_sequence() -> Result<()> {
    let mut config = build(&[])?;
    let result = apply_config_options(&mut config, &[&OptionNs::my_int(1), &MakeError, &SetMyInt123]);
    ensure!(result.is_err());
    ensure!(config.my_int == 1, "options after the failure must not run");
    Ok(())
}

#[test]
fn custom_options_extend_the_set() -> Result<()> {
    let config = build(&[&SetMyInt123])?;
    ensure!(config.my_int == 123);
    Ok(())
}

#[test]
fn renamed_constructors_set_the_original_field() -> Result<()> {
    let config = build(&[
        &OptionNs::your_int(1),
        &OptionNs::your_slice([1, 2]),
        &OptionNs::your_int_with_pointer(9),
        &OptionNs::got_both("both".to_owned()),
        &OptionNs::with_other_tag_but_no_options("other".to_owned()),
    ])?;
    ensure!(config.my_renamed_int == 1);
    ensure!(config.my_renamed_slice == [1, 2]);
    ensure!(config.my_pointer_to_renamed_int == Some(9));
    ensure!(config.with_both_tags == "both");
    ensure!(config.with_other_tag_but_no_options == "other");
    let _: sample::OptionMyRenamedInt = sample::OptionMyRenamedInt;
    Ok(())
}

#[test]
fn imported_types_are_accepted() -> Result<()> {
    let config = build(&[
        &OptionNs::my_duration(Duration::from_secs(1)),
        &OptionNs::my_duration2(Duration::from_secs(2)),
        &OptionNs::my_address(std::net::Ipv4Addr::new(10, 0, 0, 1)),
    ])?;
    ensure!(config.my_duration == Duration::from_secs(1));
    ensure!(config.my_duration2 == Duration::from_secs(2));
    ensure!(config.my_address == std::net::Ipv4Addr::new(10, 0, 0, 1));
    Ok(())
}

#[test]
fn pointer_fields_track_presence() -> Result<()> {
    let unset = build(&[])?;
    ensure!(unset.my_pointer_to_int.is_none());
    let set = build(&[&OptionNs::my_pointer_to_int(1)])?;
    ensure!(set.my_pointer_to_int == Some(1));
    let zeroed = build(&[&OptionNs::my_pointer_to_int(0)])?;
    ensure!(zeroed.my_pointer_to_int == Some(0), "zero is still a set value");
    Ok(())
}

#[test]
fn inline_records_take_one_argument_per_leaf() -> Result<()> {
    let config = build(&[&OptionNs::my_struct(1, 2)])?;
    ensure!(config.my_struct == Pair { a: 1, b: 2 });
    Ok(())
}

#[test]
fn inline_record_leaves_have_defaults() -> Result<()> {
    let config = build(&[])?;
    ensure!(config.my_struct_with_default == WithDefault { a: 1 });
    ensure!(config.my_struct == Pair::default());
    Ok(())
}

#[test]
fn pointer_records_default_to_none() -> Result<()> {
    let unset = build(&[])?;
    ensure!(unset.my_pointer_to_struct.is_none());
    let set = build(&[&OptionNs::my_pointer_to_struct(1, 2)])?;
    ensure!(set.my_pointer_to_struct.as_deref() == Some(&Pair { a: 1, b: 2 }));
    Ok(())
}

#[test]
fn inline_records_accept_variadic_leaves() -> Result<()> {
    let config = build(&[&OptionNs::my_struct_with_variadic_slice(1, [1, 2])])?;
    ensure!(
        config.my_struct_with_variadic_slice
            == WithVariadic {
                a: 1,
                b: vec![1, 2],
            }
    );
    Ok(())
}

#[test]
fn variadic_constructors_collect_in_order() -> Result<()> {
    let config = build(&[&OptionNs::my_slice([3, 1, 2])])?;
    ensure!(config.my_slice == [3, 1, 2]);
    let from_iter = build(&[&OptionNs::my_slice((1..=3).rev())])?;
    ensure!(from_iter.my_slice == [3, 2, 1]);
    let emptied = build(&[&OptionNs::my_slice(Vec::new())])?;
    ensure!(emptied.my_slice.is_empty());
    Ok(())
}

#[test]
fn optional_slices_track_presence() -> Result<()> {
    let unset = build(&[])?;
    ensure!(unset.my_pointer_to_slice.is_none());
    let set = build(&[&OptionNs::my_pointer_to_slice([1, 2])])?;
    ensure!(set.my_pointer_to_slice == Some(vec![1, 2]));
    let empty = build(&[&OptionNs::my_pointer_to_slice(Vec::new())])?;
    ensure!(empty.my_pointer_to_slice == Some(Vec::new()));
    Ok(())
}
