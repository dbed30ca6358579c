//! Kernel emitters: one generator per operation kind.
//!
//! Each emitter consumes a basis provider and produces a
//! [`GeneratedKernel`]: an external declaration line and a definition body
//! of literal C arithmetic, with array indices following the provider's
//! basis order. Emitters claim their names in the registry before emitting
//! anything, so a collision aborts before partial output exists.

use crate::basis::BasisProvider;
use crate::codegen::opcount::{total_op, OpCount};
use crate::error::{GenError, Result};
use crate::names::{kernel_name, op_count_name, NameRegistry, OpKind};
use crate::poly::PolyExpr;
use std::fmt::Write;

/// Dual host/device marker carried by every declaration and definition.
pub const DEVICE_MARKER: &str = "MGEN_CU_DH";

/// One emitted kernel: declaration plus definition. The definition is
/// empty for declaration-only stubs. Multiplication kernels also carry
/// their operation count.
#[derive(Clone, Debug)]
pub struct GeneratedKernel {
    pub name: String,
    pub decl: String,
    pub defn: String,
    pub op_count: Option<OpCount>,
}

/// `const double z0 = z[0];` locals for each coordinate. Order-0 bases
/// are constant and get none.
fn coord_locals(ndim: usize, poly_order: usize) -> String {
    let mut out = String::new();
    if poly_order > 0 {
        for d in 0..ndim {
            writeln!(out, "  const double z{} = z[{}];", d, d).unwrap();
        }
    }
    out
}

fn defn_header(ret: &str, name: &str, params: &str) -> String {
    format!("{}\n{}\n{}({})\n{{\n", DEVICE_MARKER, ret, name, params)
}

/// Point evaluation: one assignment per basis function.
pub fn gen_eval<P: BasisProvider>(p: &P, names: &mut NameRegistry) -> Result<GeneratedKernel> {
    let name = kernel_name(p.key(), OpKind::Eval);
    names.claim(&name)?;

    let params = "const double *z, double *b";
    let decl = format!("{} void {}({});", DEVICE_MARKER, name, params);

    let mut defn = defn_header("void", &name, params);
    defn.push_str(&coord_locals(p.ndim(), p.poly_order()));
    for (i, b) in p.basis_functions().iter().enumerate() {
        writeln!(defn, "  b[{}] = {};", i, b.render()).unwrap();
    }
    defn.push_str("}\n");

    Ok(GeneratedKernel {
        name,
        decl,
        defn,
        op_count: None,
    })
}

/// Expansion evaluation: the scalar value of `sum_i f[i]*b_i` at a point.
pub fn gen_eval_expand<P: BasisProvider>(
    p: &P,
    names: &mut NameRegistry,
) -> Result<GeneratedKernel> {
    let name = kernel_name(p.key(), OpKind::EvalExpand);
    names.claim(&name)?;

    let params = "const double *z, const double *f";
    let decl = format!("{} double {}({});", DEVICE_MARKER, name, params);

    let mut defn = defn_header("double", &name, params);
    defn.push_str(&coord_locals(p.ndim(), p.poly_order()));
    writeln!(defn, "  return {};", p.expand("f").render()).unwrap();
    defn.push_str("}\n");

    Ok(GeneratedKernel {
        name,
        decl,
        defn,
        op_count: None,
    })
}

/// Gradient of an expansion: one branch per direction, with an
/// unreachable fallback return to satisfy exhaustiveness.
pub fn gen_eval_grad_expand<P: BasisProvider>(
    p: &P,
    names: &mut NameRegistry,
) -> Result<GeneratedKernel> {
    let name = kernel_name(p.key(), OpKind::EvalGradExpand);
    names.claim(&name)?;

    let params = "int dir, const double *z, const double *f";
    let decl = format!("{} double {}({});", DEVICE_MARKER, name, params);

    let expansion = p.expand("f");
    let mut defn = defn_header("double", &name, params);
    defn.push_str(&coord_locals(p.ndim(), p.poly_order()));
    for d in 0..p.ndim() {
        writeln!(defn, "  if (dir == {})", d).unwrap();
        writeln!(defn, "    return {};", expansion.diff(d).render()).unwrap();
        defn.push('\n');
    }
    defn.push_str("  return 0.0; // unreachable for valid directions\n");
    defn.push_str("}\n");

    Ok(GeneratedKernel {
        name,
        decl,
        defn,
        op_count: None,
    })
}

/// The reflection sign of every basis function under `z_d -> -z_d`.
///
/// For a valid orthogonal basis each ratio `b_i(-z_d)/b_i` reduces to
/// exactly +1 or -1; anything else aborts the configuration.
pub fn reflection_signs<P: BasisProvider>(
    p: &P,
    kernel: &str,
    dir: usize,
) -> Result<Vec<i8>> {
    let nvars = p.ndim();
    let neg = PolyExpr::var(nvars, dir).neg();
    let mut signs = Vec::with_capacity(p.num_basis());
    for (i, b) in p.basis_functions().iter().enumerate() {
        let flipped = b.substitute(dir, &neg);
        if flipped == *b {
            signs.push(1);
        } else if flipped == b.neg() {
            signs.push(-1);
        } else {
            return Err(GenError::SignInvariant {
                kernel: kernel.to_string(),
                dir,
                index: i,
                rendered: flipped.render(),
            });
        }
    }
    Ok(signs)
}

fn gen_flip_sign<P: BasisProvider>(
    p: &P,
    names: &mut NameRegistry,
    op: OpKind,
) -> Result<GeneratedKernel> {
    let name = kernel_name(p.key(), op);
    names.claim(&name)?;

    let params = "int dir, const double *f, double *fout";
    let decl = format!("{} void {}({});", DEVICE_MARKER, name, params);

    let mut defn = defn_header("void", &name, params);
    for d in 0..p.ndim() {
        let signs = reflection_signs(p, &name, d)?;
        writeln!(defn, "  if (dir == {}) {{", d).unwrap();
        for (i, s) in signs.iter().enumerate() {
            // The even variant negates the odd-parity signs.
            let s = if op == OpKind::FlipEvenSign { -s } else { *s };
            writeln!(defn, "    fout[{}] = {}.0*f[{}];", i, s, i).unwrap();
        }
        defn.push_str("  }\n");
    }
    defn.push_str("}\n");

    Ok(GeneratedKernel {
        name,
        decl,
        defn,
        op_count: None,
    })
}

/// Sign flip of odd-parity components under one coordinate reflection.
pub fn gen_flip_odd_sign<P: BasisProvider>(
    p: &P,
    names: &mut NameRegistry,
) -> Result<GeneratedKernel> {
    gen_flip_sign(p, names, OpKind::FlipOddSign)
}

/// Sign flip of even-parity components under one coordinate reflection.
pub fn gen_flip_even_sign<P: BasisProvider>(
    p: &P,
    names: &mut NameRegistry,
) -> Result<GeneratedKernel> {
    gen_flip_sign(p, names, OpKind::FlipEvenSign)
}

fn gen_decl_stub<P: BasisProvider>(
    p: &P,
    names: &mut NameRegistry,
    op: OpKind,
    params: &str,
) -> Result<GeneratedKernel> {
    let name = kernel_name(p.key(), op);
    names.claim(&name)?;
    Ok(GeneratedKernel {
        decl: format!("{} void {}({});", DEVICE_MARKER, name, params),
        // TODO: emit node-coordinate and nodal-to-modal bodies; only the
        // declarations are generated for now and the build must supply
        // definitions separately.
        defn: String::new(),
        name,
        op_count: None,
    })
}

/// Node coordinates: declaration-only stub.
pub fn gen_node_coords<P: BasisProvider>(
    p: &P,
    names: &mut NameRegistry,
) -> Result<GeneratedKernel> {
    gen_decl_stub(p, names, OpKind::NodeCoords, "double *node_coords")
}

/// Nodal-to-modal transform: declaration-only stub.
pub fn gen_nodal_to_modal<P: BasisProvider>(
    p: &P,
    names: &mut NameRegistry,
) -> Result<GeneratedKernel> {
    gen_decl_stub(
        p,
        names,
        OpKind::NodalToModal,
        "const double *fnodal, double *fmodal",
    )
}

/// All per-family basis kernels for one configuration, in emission order.
pub fn basis_kernels<P: BasisProvider>(
    p: &P,
    names: &mut NameRegistry,
) -> Result<Vec<GeneratedKernel>> {
    Ok(vec![
        gen_eval(p, names)?,
        gen_eval_expand(p, names)?,
        gen_eval_grad_expand(p, names)?,
        gen_flip_odd_sign(p, names)?,
        gen_flip_even_sign(p, names)?,
        gen_node_coords(p, names)?,
        gen_nodal_to_modal(p, names)?,
    ])
}

/// Galerkin-projected binary multiplication, plus the routine returning
/// its aggregate operation count.
pub fn gen_binop_mul<P: BasisProvider>(
    p: &P,
    names: &mut NameRegistry,
) -> Result<GeneratedKernel> {
    let name = kernel_name(p.key(), OpKind::BinopMul);
    let count_name = op_count_name(p.key());
    names.claim(&name)?;
    names.claim(&count_name)?;

    let params = "const double *f, const double *g, double *fg";
    let mut decl = format!("{} void {}({});\n", DEVICE_MARKER, name, params);
    write!(
        decl,
        "struct mgen_kern_op_count {}(void);",
        count_name
    )
    .unwrap();

    let fg = p.expand("f").mul(&p.expand("g"));

    let mut total = OpCount::default();
    let mut defn = defn_header("void", &name, params);
    for (i, b) in p.basis_functions().iter().enumerate() {
        let out = p.inner_product(b, &fg);
        writeln!(defn, "  fg[{}] = {};", i, out.render()).unwrap();
        total += total_op(&out);
    }
    writeln!(
        defn,
        "  // num_sum = {}, num_prod = {}",
        total.num_sum, total.num_prod
    )
    .unwrap();
    defn.push_str("}\n\n");

    writeln!(defn, "struct mgen_kern_op_count\n{}(void)\n{{", count_name).unwrap();
    writeln!(
        defn,
        "  return (struct mgen_kern_op_count) {{ .num_sum = {}, .num_prod = {} }};",
        total.num_sum, total.num_prod
    )
    .unwrap();
    defn.push_str("}\n");

    Ok(GeneratedKernel {
        name,
        decl,
        defn,
        op_count: Some(total),
    })
}
