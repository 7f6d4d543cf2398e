use anyhow::Result;
use axeview_basic::{LengthEnv, axis, axis_var, tagged, tagged_var};
use axeview_core::{axes, group, prelude::*};
use axeview_layout::prelude::*;
use proptest::prelude::*;

#[test]
fn lookup_agrees_with_identity_reaxe() -> Result<()> {
    let a = axis("A", 3);
    let b = axis("B", 4);
    let t = TensorDescriptor::new(axes![&a, &b], DType::Float32, &())?;
    let sa = t.axis_info(&a)?.stride;
    let sb = t.axis_info(&b)?.stride;

    let r = t.reaxe(axes![&a, &b], true, &())?;
    assert_eq!(t.lookup(&[2, 3])?, t.offset() + 2 * sa + 3 * sb);
    assert_eq!(r.lookup(&[2, 3])?, t.lookup(&[2, 3])?);
    Ok(())
}

#[test]
fn broadcast_gives_zero_stride() -> Result<()> {
    let a = axis("A", 5);
    let c = axis_var("C");
    let env = LengthEnv::new().with_length(&c, 7);
    let t = TensorDescriptor::new([&a], DType::Float64, &env)?;

    let r = t.reaxe([&a, &c], true, &env)?;
    assert_eq!(r.axis_info(&c)?.stride, 0);
    assert_eq!(r.shape(), &[5, 7]);
    assert_eq!(r.lookup(&[4, 6])?, r.lookup(&[4, 0])?);

    let err = t.reaxe([&a, &c], false, &env).unwrap_err();
    assert!(matches!(err, LayoutError::AxisNotFound { .. }));
    Ok(())
}

#[test]
fn fixed_index_drops_the_axis() -> Result<()> {
    let a = axis("A", 2);
    let b = axis("B", 3);
    let c = axis("C", 4);
    let t = TensorDescriptor::new(axes![&a, &b, &c], DType::Float32, &())?;
    let sb = t.axis_info(&b)?.stride;

    let s = t.slice(&[SliceSpec::FULL, SliceSpec::Index(2), SliceSpec::FULL])?;
    assert_eq!(s.axes(), axes![&a, &c].as_slice());
    assert_eq!(s.offset(), t.offset() + 2 * sb);
    assert_eq!(s.axis_info(&c)?.stride, t.axis_info(&c)?.stride);
    Ok(())
}

#[test]
fn matrix_end_to_end() -> Result<()> {
    let m = axis("M", 2);
    let n = axis("N", 3);
    let entries = axes![&m, &n];
    assert_eq!(shape_of(&entries, &())?, vec![2, 3]);
    assert_eq!(total_size(&entries, &())?, 6);

    let t = TensorDescriptor::new(entries, DType::Float32, &())?;
    assert_eq!(t.strides(), &[4, 8]);
    assert_eq!(t.lookup(&[1, 2])?, t.offset() + 4 + 16);
    assert_eq!(t.required_bytes(), 24);

    let layout = t.layout();
    assert_eq!(layout.required_bytes(), Some(24));
    assert_eq!(layout.buffer, t.buffer_id());
    Ok(())
}

#[test]
fn reaxe_of_a_slice_keeps_its_window() -> Result<()> {
    let a = axis("A", 3);
    let b = axis("B", 4);
    let t = TensorDescriptor::new(axes![&a, &b], DType::Float32, &())?;

    let s = t.slice(&[SliceSpec::range(1, 3), SliceSpec::FULL])?;
    let r = s.reaxe(axes![&b, &a], false, &())?;
    assert_eq!(r.shape(), &[4, 2]);
    assert_eq!(r.strides(), &[12, 4]);
    assert_eq!(r.offset(), 4);
    assert_eq!(r.lookup(&[3, 1])?, t.lookup(&[2, 3])?);
    assert!(r.lookup(&[0, 2]).is_err());
    Ok(())
}

#[test]
fn transpose_of_a_stepped_slice() -> Result<()> {
    let a = axis("A", 3);
    let b = axis("B", 4);
    let t = TensorDescriptor::new(axes![&a, &b], DType::Float32, &())?;

    let s = t.slice(&[SliceSpec::FULL, SliceSpec::FULL.step_by(2)])?;
    assert_eq!(s.axis_info(&b)?.length, 2);
    let r = s.reaxe(axes![&b, &a], false, &())?;
    assert_eq!(r.shape(), &[2, 3]);
    assert_eq!(r.strides(), &[24, 4]);
    for (j, i) in [(0, 0), (1, 2), (1, 1)] {
        assert_eq!(r.lookup(&[j, i])?, t.lookup(&[i, 2 * j])?);
    }
    Ok(())
}

#[test]
fn tagged_axes_are_matched_by_name() -> Result<()> {
    let mut env = LengthEnv::new();
    tagged_var("batch").set_length(&mut env, 8)?;
    let t = TensorDescriptor::new(
        axes![&tagged("feature", 16), &tagged_var("batch")],
        DType::Float32,
        &env,
    )?;
    assert_eq!(t.shape(), &[16, 8]);

    // axes declared again by name address the same layout
    let batch = tagged_var("batch");
    assert_eq!(t.axis_info(&batch)?.stride, 64);
    let r = t.reaxe([&batch, &tagged("feature", 16)], false, &env)?;
    assert_eq!(r.strides(), &[64, 4]);
    assert!(t.reaxe([&tagged("time", 2)], false, &env).is_err());
    Ok(())
}

#[test]
fn variable_axes_resolve_per_session() -> Result<()> {
    let n = axis_var("N");
    let k = axis("K", 16);
    let mut env = LengthEnv::new();
    n.set_length(&mut env, 8)?;
    let mut other = env.fork();
    n.set_length(&mut other, 2)?;

    let big = TensorDescriptor::new(axes![&k, &n], DType::Float32, &env)?;
    let small = TensorDescriptor::new(axes![&k, &n], DType::Float32, &other)?;
    assert_eq!(big.shape(), &[16, 8]);
    assert_eq!(small.shape(), &[16, 2]);
    Ok(())
}

#[test]
fn grouped_reaxe_flattens_without_copy() -> Result<()> {
    let c = axis("C", 3);
    let h = axis("H", 4);
    let w = axis("W", 5);
    let n = axis("N", 2);
    let t = TensorDescriptor::new(axes![&c, &h, &w, &n], DType::Float32, &())?;
    let buffer = t.buffer().expect("owner holds its buffer");

    let flat = t.reaxe(axes![group!(&w, &h, &c), &n], false, &())?;
    assert_eq!(flat.shape(), &[60, 2]);
    assert_eq!(flat.strides(), &[4, 240]);
    assert_eq!(flat.buffer_id(), buffer.id());
    assert_eq!(buffer.live_views(), 1);

    // back to the original order through the group members
    let back = flat.reaxe_like(&t, false, &())?;
    assert_eq!(back.layout().strides, t.layout().strides);
    assert_eq!(buffer.live_views(), 2);
    Ok(())
}

#[test]
fn config_from_json() -> Result<()> {
    let config: LayoutConfig = serde_json::from_str(r#"{ "broadcast": false, "dtype": "float64" }"#)?;
    assert_eq!(
        config,
        LayoutConfig {
            verify: true,
            broadcast: false,
            dtype: DType::Float64,
        }
    );

    let a = axis("A", 3);
    let b = axis("B", 2);
    let t = TensorDescriptor::from_config([&a], &config, &())?;
    assert_eq!(t.dtype(), DType::Float64);
    assert_eq!(t.strides(), &[8]);
    assert!(t.reaxe_with([&a, &b], &config, &()).is_err());
    assert!(t.reaxe_with([&a, &b], &LayoutConfig::default(), &()).is_ok());

    let layout: Layout = serde_json::from_str(&serde_json::to_string(&t.layout())?)?;
    assert_eq!(layout, t.layout());
    Ok(())
}

proptest! {
    #[test]
    fn prop_transpose_addresses_same_bytes(
        (la, lb, i, j) in (1usize..8, 1usize..8).prop_flat_map(|(la, lb)| (Just(la), Just(lb), 0..la, 0..lb))
    ) {
        let a = axis("A", la);
        let b = axis("B", lb);
        let t = TensorDescriptor::new(axes![&a, &b], DType::Int16, &()).unwrap();
        let r = t.reaxe(axes![&b, &a], false, &()).unwrap();
        prop_assert_eq!(t.lookup(&[i, j]).unwrap(), r.lookup(&[j, i]).unwrap());
        prop_assert!(r.lookup(&[j, i]).unwrap() < t.required_bytes());
    }
}
