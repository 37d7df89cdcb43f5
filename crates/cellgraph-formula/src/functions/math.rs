//! Numeric reduction functions

use crate::error::FormulaResult;
use cellgraph_core::Value;

fn numbers(args: &[Value]) -> FormulaResult<Vec<f64>> {
    args.iter()
        .map(|arg| arg.as_float().map_err(Into::into))
        .collect()
}

/// MIN(value1; value2; ...)
pub fn fn_min(args: &[Value]) -> FormulaResult<Value> {
    let min = numbers(args)?.into_iter().fold(f64::INFINITY, f64::min);
    Ok(Value::Float(min))
}

/// MAX(value1; value2; ...)
pub fn fn_max(args: &[Value]) -> FormulaResult<Value> {
    let max = numbers(args)?.into_iter().fold(f64::NEG_INFINITY, f64::max);
    Ok(Value::Float(max))
}

/// AVERAGE(value1; value2; ...)
pub fn fn_average(args: &[Value]) -> FormulaResult<Value> {
    let values = numbers(args)?;
    let sum: f64 = values.iter().sum();
    Ok(Value::Float(sum / values.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floats(values: &[f64]) -> Vec<Value> {
        values.iter().copied().map(Value::Float).collect()
    }

    #[test]
    fn test_min_max() {
        let args = floats(&[1.0, 2.0, 10.0, 6.0, 3.0]);
        assert_eq!(fn_min(&args).unwrap(), Value::Float(1.0));
        assert_eq!(fn_max(&args).unwrap(), Value::Float(10.0));
    }

    #[test]
    fn test_average() {
        let args = floats(&[1.0, 2.0, 10.0, 6.0, 3.0]);
        assert_eq!(fn_average(&args).unwrap(), Value::Float(4.4));
    }

    #[test]
    fn test_text_arguments_are_converted() {
        let args = vec![Value::from("4"), Value::Integer(2), Value::Boolean(true)];
        assert_eq!(fn_min(&args).unwrap(), Value::Float(1.0));
        assert!(fn_max(&[Value::from("four")]).is_err());
    }
}
